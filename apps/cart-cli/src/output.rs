//! Rendering of the cart for the terminal.

use anyhow::Result;

use storefront_cart::CartConfig;
use storefront_core::Cart;

/// Renders the cart as a table, or as the persisted snapshot JSON.
pub fn render(cart: &Cart, config: &CartConfig, json: bool) -> Result<String> {
    if json {
        return Ok(serde_json::to_string_pretty(cart)?);
    }
    Ok(render_table(cart, config))
}

/// ```text
/// CART                                                  3 items
/// ----------------------------------------------------------------
/// Shirt                 x2     $100.00     $200.00
/// Bag                   x1      $80.00      $80.00  (save $20.00)
/// ----------------------------------------------------------------
/// TOTAL                                                $280.00
/// ```
fn render_table(cart: &Cart, config: &CartConfig) -> String {
    let rule = "-".repeat(64);
    let mut out = String::new();

    out.push_str(&format!("{:<50}{:>8} items\n", "CART", cart.item_count()));
    out.push_str(&rule);
    out.push('\n');

    if cart.is_empty() {
        out.push_str("(empty)\n");
    }

    for line in cart.lines() {
        out.push_str(&format!(
            "{:<24}x{:<5}{:>12}{:>12}",
            truncate(&line.name, 23),
            line.quantity,
            config.format_currency(line.unit_price),
            config.format_currency(line.line_total()),
        ));
        if let Some(savings) = line.savings() {
            out.push_str(&format!("  (save {})", config.format_currency(savings)));
        }
        out.push('\n');
    }

    out.push_str(&rule);
    out.push('\n');
    out.push_str(&format!(
        "{:<44}{:>20}\n",
        "TOTAL",
        config.format_currency(cart.total())
    ));
    out
}

fn truncate(name: &str, max_chars: usize) -> String {
    if name.chars().count() <= max_chars {
        return name.to_string();
    }
    let mut short: String = name.chars().take(max_chars.saturating_sub(1)).collect();
    short.push('…');
    short
}
