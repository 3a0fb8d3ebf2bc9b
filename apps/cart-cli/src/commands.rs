//! # CLI Commands
//!
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │                    One CLI Invocation                                   │
//! │                                                                         │
//! │  CartConfig ──► open_engine() ──► restore snapshot                     │
//! │                      │                                                  │
//! │                      ├── subscribe(printer)                            │
//! │                      │                                                  │
//! │                      ▼                                                  │
//! │            add / update / remove / clear ──► persist ──► printer       │
//! │                                                                         │
//! │  show: no mutation, the cart is printed directly                      │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```

use std::path::Path;

use anyhow::{anyhow, Context, Result};
use tracing::{debug, info};

use storefront_cart::{CartConfig, CartEngine};
use storefront_core::{Product, ProductVariant};

use crate::output;
use crate::{AddArgs, CatalogArgs, Commands};

/// Runs one subcommand against the configured cart.
pub fn run(command: Commands, config: &CartConfig, json: bool) -> Result<()> {
    let mut engine = config
        .open_engine()
        .context("Failed to open the cart store")?;

    if let Commands::Show = command {
        println!("{}", output::render(&engine.cart(), config, json)?);
        return Ok(());
    }

    let printer_config = config.clone();
    let _printer = engine.subscribe(move |cart| {
        match output::render(cart, &printer_config, json) {
            Ok(text) => println!("{text}"),
            Err(err) => eprintln!("Failed to render cart: {err:#}"),
        }
    });

    execute(&mut engine, command)
}

/// Applies a mutating subcommand.
fn execute(engine: &mut CartEngine, command: Commands) -> Result<()> {
    match command {
        Commands::Show => {}
        Commands::Add(args) => add(engine, args)?,
        Commands::AddFromCatalog(args) => add_from_catalog(engine, args)?,
        Commands::Update(args) => {
            if args.qty > 0 && !engine.has_item(args.variant) {
                eprintln!("Variant {} is not in the cart", args.variant);
            }
            engine.update_quantity(args.variant, args.qty);
        }
        Commands::Remove(args) => {
            engine.remove_item(args.variant);
        }
        Commands::Clear => {
            engine.clear();
        }
    }
    Ok(())
}

fn add(engine: &mut CartEngine, args: AddArgs) -> Result<()> {
    let mut variant = ProductVariant::new(args.variant, args.price);
    variant.product_id = args.product;
    if let Some(promo) = args.promo {
        variant = variant.with_promotional_price(promo);
    }
    if let Some(compare) = args.compare {
        variant = variant.with_compare_at_price(compare);
    }

    engine
        .add_item(args.product, &variant, args.name, args.image, args.qty)
        .context("Could not add item")?;
    Ok(())
}

fn add_from_catalog(engine: &mut CartEngine, args: CatalogArgs) -> Result<()> {
    let catalog = load_catalog(&args.catalog)?;
    let product = catalog
        .iter()
        .find(|p| p.id == args.product)
        .ok_or_else(|| anyhow!("Product {} not found in catalog", args.product))?;
    let variant = product.variant(args.variant).ok_or_else(|| {
        anyhow!(
            "Variant {} not found in product {}",
            args.variant,
            args.product
        )
    })?;

    let name = product.display_name(&args.lang).to_string();
    let image = product.primary_image().map(|img| img.src.clone());
    info!(product_id = product.id, variant_id = variant.id, %name, "Adding from catalog");

    engine
        .add_item(product.id, variant, name, image, args.qty)
        .context("Could not add item")?;
    Ok(())
}

/// Reads a catalog export: a JSON array of products.
fn load_catalog(path: &Path) -> Result<Vec<Product>> {
    let contents = std::fs::read_to_string(path)
        .with_context(|| format!("Failed to read catalog {}", path.display()))?;
    let catalog: Vec<Product> = serde_json::from_str(&contents)
        .with_context(|| format!("Invalid catalog {}", path.display()))?;
    debug!(products = catalog.len(), "Catalog loaded");
    Ok(catalog)
}

#[cfg(test)]
mod tests {
    use super::*;
    use storefront_cart::{StorageBackend, StorageSettings};
    use storefront_core::Money;

    use crate::{RemoveArgs, UpdateArgs};

    const CATALOG: &str = r#"[
        {
            "id": 10,
            "name": {"es": "Remera", "pt": "Camiseta"},
            "variants": [
                {"id": 1, "product_id": 10, "price": "100.00", "promotional_price": "80.00"},
                {"id": 2, "product_id": 10, "price": "100.00", "promotional_price": ""}
            ],
            "images": [
                {"id": 6, "src": "https://cdn/back.jpg", "position": 2},
                {"id": 5, "src": "https://cdn/front.jpg", "position": 1}
            ]
        }
    ]"#;

    fn file_config(dir: &Path) -> CartConfig {
        CartConfig {
            storage: StorageSettings {
                data_dir: Some(dir.to_path_buf()),
                ..StorageSettings::default()
            },
            ..CartConfig::default()
        }
    }

    fn add_args(qty: i64) -> AddArgs {
        AddArgs {
            product: 10,
            variant: 1,
            price: "100.00".to_string(),
            promo: None,
            compare: None,
            name: "Shirt".to_string(),
            image: None,
            qty,
        }
    }

    fn catalog_args(path: &Path, variant: u64) -> CatalogArgs {
        CatalogArgs {
            catalog: path.to_path_buf(),
            product: 10,
            variant,
            qty: 1,
            lang: "pt".to_string(),
        }
    }

    #[test]
    fn test_commands_persist_between_runs() {
        let dir = tempfile::tempdir().unwrap();
        let config = file_config(dir.path());

        run(Commands::Add(add_args(2)), &config, false).unwrap();
        run(Commands::Add(add_args(1)), &config, true).unwrap();
        assert_eq!(config.open_engine().unwrap().item_quantity(1), 3);

        run(
            Commands::Update(UpdateArgs { variant: 1, qty: 5 }),
            &config,
            false,
        )
        .unwrap();
        assert_eq!(config.open_engine().unwrap().item_quantity(1), 5);

        run(Commands::Remove(RemoveArgs { variant: 1 }), &config, false).unwrap();
        assert!(config.open_engine().unwrap().cart().is_empty());

        run(Commands::Show, &config, false).unwrap();
    }

    #[test]
    fn test_invalid_add_is_an_error() {
        let mut config = CartConfig::default();
        config.storage.backend = StorageBackend::Memory;

        assert!(run(Commands::Add(add_args(0)), &config, false).is_err());

        let mut bad_price = add_args(1);
        bad_price.price = "free".to_string();
        assert!(run(Commands::Add(bad_price), &config, false).is_err());
    }

    #[test]
    fn test_add_from_catalog() {
        let dir = tempfile::tempdir().unwrap();
        let catalog = dir.path().join("products.json");
        std::fs::write(&catalog, CATALOG).unwrap();
        let mut engine = CartEngine::new(storefront_cart::MemoryStore::new(), "cart");

        add_from_catalog(&mut engine, catalog_args(&catalog, 1)).unwrap();
        add_from_catalog(&mut engine, catalog_args(&catalog, 2)).unwrap();

        let cart = engine.cart();
        let promo = cart.line(1).unwrap();
        assert_eq!(promo.name, "Camiseta");
        assert_eq!(promo.image.as_deref(), Some("https://cdn/front.jpg"));
        assert_eq!(promo.unit_price, Money::from_cents(8000));
        assert_eq!(cart.line(2).unwrap().unit_price, Money::from_cents(10000));
        assert_eq!(cart.total(), Money::from_cents(18000));
    }

    #[test]
    fn test_catalog_lookup_errors() {
        let dir = tempfile::tempdir().unwrap();
        let catalog = dir.path().join("products.json");
        std::fs::write(&catalog, CATALOG).unwrap();
        let mut engine = CartEngine::new(storefront_cart::MemoryStore::new(), "cart");

        assert!(add_from_catalog(&mut engine, catalog_args(&catalog, 99)).is_err());
        assert!(add_from_catalog(&mut engine, catalog_args(&dir.path().join("none.json"), 1))
            .is_err());

        std::fs::write(&catalog, "{\"not\": \"a list\"}").unwrap();
        assert!(add_from_catalog(&mut engine, catalog_args(&catalog, 1)).is_err());
        assert!(engine.cart().is_empty());
    }
}
