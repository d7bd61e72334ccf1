//! # Seed Data Generator
//!
//! Populates the database with test data for development.
//!
//! ## Usage
//! ```bash
//! # Generate the full catalog (default)
//! cargo run -p lonja-db --bin seed
//!
//! # Generate a smaller catalog
//! cargo run -p lonja-db --bin seed -- --count 60
//!
//! # Specify database path
//! cargo run -p lonja-db --bin seed -- --db ./data/lonja.db
//! ```
//!
//! ## Generated Data
//! Creates a realistic market-day dataset:
//! - Product catalog across categories (marisco, pescado blanco, pescado
//!   azul, cefalópodos, moluscos), one row per species and packaging
//! - Restaurant customers
//! - Vendors with per-product rates
//! - A few submitted purchase orders, so order numbering and stored
//!   totals have data to show on first launch

use chrono::Utc;
use std::env;
use uuid::Uuid;

use lonja_core::{
    format_order_no, Category, CreateOrder, Customer, Money, OrderItemInput, Percent, Product,
    Vendor, DEFAULT_TAX_PERCENT,
};
use lonja_db::{Database, DbConfig};
use rust_decimal::Decimal;
use tracing_subscriber::EnvFilter;

/// Categories with the species sold under each.
const CATEGORIES: &[(&str, &[&str])] = &[
    (
        "Marisco",
        &[
            "Gamba blanca",
            "Gamba roja",
            "Langostino",
            "Cigala",
            "Carabinero",
            "Camarón",
            "Bogavante",
            "Nécora",
            "Centollo",
            "Buey de mar",
            "Percebe",
            "Langosta",
        ],
    ),
    (
        "Pescado blanco",
        &[
            "Merluza",
            "Rape",
            "Lubina",
            "Dorada",
            "Rodaballo",
            "Lenguado",
            "Bacalao",
            "Besugo",
            "Corvina",
            "Pescadilla",
            "Gallo",
            "Salmonete",
        ],
    ),
    (
        "Pescado azul",
        &[
            "Sardina",
            "Boquerón",
            "Atún",
            "Bonito",
            "Caballa",
            "Jurel",
            "Salmón",
            "Pez espada",
            "Melva",
            "Anchoa",
        ],
    ),
    (
        "Cefalópodos",
        &["Pulpo", "Calamar", "Sepia", "Chipirón", "Pota", "Puntilla"],
    ),
    (
        "Moluscos",
        &[
            "Almeja fina",
            "Almeja babosa",
            "Mejillón",
            "Ostra",
            "Berberecho",
            "Navaja",
            "Zamburiña",
            "Vieira",
            "Coquina",
            "Cañaílla",
        ],
    ),
];

/// Packaging variants with their price addon in cents.
const VARIANTS: &[(&str, i64)] = &[
    ("granel", 0),
    ("ración", 50),
    ("caja 1 kg", 120),
    ("caja 3 kg", 300),
    ("caja 5 kg", 450),
    ("caja 10 kg", 800),
];

/// Restaurant customers: (name, email, phone, address).
const CUSTOMERS: &[(&str, &str, &str, &str)] = &[
    (
        "Restaurante La Barca",
        "pedidos@labarca.es",
        "+34 956 110 234",
        "Paseo Marítimo 12",
    ),
    (
        "Marisquería Puerto",
        "compras@marisqueriapuerto.es",
        "+34 956 223 481",
        "Muelle Pesquero 3",
    ),
    (
        "Bar Centro",
        "barcentro@gmail.com",
        "+34 611 482 930",
        "Plaza Mayor 5",
    ),
    (
        "Taberna del Mar",
        "hola@tabernadelmar.es",
        "+34 622 019 344",
        "Calle Ancha 44",
    ),
    (
        "Casa Emilia",
        "casaemilia@hotmail.com",
        "+34 956 771 205",
        "Avenida de la Bahía 9",
    ),
    (
        "Arrocería Levante",
        "reservas@arrocerialevante.es",
        "+34 965 330 186",
        "Calle Valencia 21",
    ),
    (
        "Hotel Miramar",
        "fnb@hotelmiramar.es",
        "+34 956 402 918",
        "Paseo Marítimo 31",
    ),
    (
        "Freiduría El Faro",
        "elfaro@freiduria.es",
        "+34 618 554 077",
        "Calle del Faro 2",
    ),
];

/// Vendors: (name, email, phone).
const VENDORS: &[(&str, &str, &str)] = &[
    (
        "Cofradía de Pescadores Santa Ana",
        "lonja@cofradiasantaana.es",
        "+34 956 880 011",
    ),
    (
        "Barca Hermanos Vidal",
        "hvidal@pescafresca.es",
        "+34 619 220 348",
    ),
    (
        "Mariscos del Cantábrico SL",
        "ventas@mariscoscantabrico.es",
        "+34 985 117 642",
    ),
    (
        "Lonja de Isla Cristina",
        "subastas@lonjaislacristina.es",
        "+34 959 343 290",
    ),
    (
        "Congelados Atlántico",
        "comercial@congeladosatlantico.es",
        "+34 981 552 760",
    ),
];

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    init_tracing();

    // Parse command line arguments
    let args: Vec<String> = env::args().collect();

    let mut count: usize = 300;
    let mut db_path = String::from("./lonja_dev.db");

    let mut i = 1;
    while i < args.len() {
        match args[i].as_str() {
            "--count" | "-c" => {
                if i + 1 < args.len() {
                    count = args[i + 1].parse().unwrap_or(300);
                    i += 1;
                }
            }
            "--db" | "-d" => {
                if i + 1 < args.len() {
                    db_path = args[i + 1].clone();
                    i += 1;
                }
            }
            "--help" | "-h" => {
                println!("Lonja Seed Data Generator");
                println!();
                println!("Usage: seed [OPTIONS]");
                println!();
                println!("Options:");
                println!("  -c, --count <N>    Max number of products to generate (default: 300)");
                println!("  -d, --db <PATH>    Database file path (default: ./lonja_dev.db)");
                println!("  -h, --help         Show this help message");
                return Ok(());
            }
            _ => {}
        }
        i += 1;
    }

    println!("🌱 Lonja Seed Data Generator");
    println!("============================");
    println!("Database: {}", db_path);
    println!("Products: up to {}", count);
    println!();

    // Connect to database
    let config = DbConfig::new(&db_path);
    let db = Database::new(config).await?;

    println!("✓ Connected to database");
    println!("✓ Migrations applied");

    // Check existing products
    let existing = db.products().count().await?;
    if existing > 0 {
        println!("⚠ Database already has {} products", existing);
        println!("  Skipping seed to avoid duplicates.");
        println!("  Delete the database file to regenerate.");
        return Ok(());
    }

    // Catalog
    println!();
    println!("Generating catalog...");

    let mut products: Vec<Product> = Vec::new();
    let start = std::time::Instant::now();

    for (category_idx, (category_name, species)) in CATEGORIES.iter().enumerate() {
        let category = Category {
            id: Uuid::new_v4().to_string(),
            name: category_name.to_string(),
            description: None,
        };
        db.categories().insert(&category).await?;

        for (species_idx, species_name) in species.iter().enumerate() {
            for (variant_idx, (variant_name, price_addon)) in VARIANTS.iter().enumerate() {
                if products.len() >= count {
                    break;
                }

                let product = generate_product(
                    species_name,
                    variant_name,
                    *price_addon,
                    &category.id,
                    category_idx * 1000 + species_idx * 10 + variant_idx,
                );

                if let Err(e) = db.products().insert(&product).await {
                    eprintln!("Failed to insert {}: {}", product.name, e);
                    continue;
                }

                products.push(product);

                if products.len() % 100 == 0 {
                    println!("  Generated {} products...", products.len());
                }
            }

            if products.len() >= count {
                break;
            }
        }

        if products.len() >= count {
            break;
        }
    }

    // Customers
    println!();
    println!("Generating customers...");

    let mut customers: Vec<Customer> = Vec::new();
    for (name, email, phone, address) in CUSTOMERS {
        let customer = Customer {
            id: Uuid::new_v4().to_string(),
            name: name.to_string(),
            email: Some(email.to_string()),
            phone: Some(phone.to_string()),
            address: Some(address.to_string()),
        };
        db.customers().insert(&customer).await?;
        customers.push(customer);
    }
    println!("  {} customers", customers.len());

    // Vendors with rates on a slice of the catalog
    println!();
    println!("Generating vendors and rates...");

    let mut rates = 0;
    for (vendor_idx, (name, email, phone)) in VENDORS.iter().enumerate() {
        let vendor = Vendor {
            id: Uuid::new_v4().to_string(),
            name: name.to_string(),
            email: Some(email.to_string()),
            phone: Some(phone.to_string()),
        };
        db.vendors().insert(&vendor).await?;

        for product in products.iter().skip(vendor_idx).step_by(VENDORS.len()).take(12) {
            let rate = vendor_rate(product, vendor_idx);
            db.vendor_rates().upsert(&vendor.id, &product.id, rate).await?;
            rates += 1;
        }
    }
    println!("  {} vendors, {} rates", VENDORS.len(), rates);

    // A few submitted orders, so the dashboard opens with history
    println!();
    println!("Creating sample orders...");

    if products.len() >= 4 {
        let reduced_iva = 10;
        let sample_orders = vec![
            CreateOrder {
                customer_id: customers[0].id.clone(),
                items: vec![
                    order_line(&products[0], 3, 0, reduced_iva),
                    order_line(&products[1], 2, 0, reduced_iva),
                ],
            },
            CreateOrder {
                customer_id: customers[1].id.clone(),
                items: vec![
                    order_line(&products[2], 5, 5, reduced_iva),
                    order_line(&products[3], 1, 5, reduced_iva),
                    order_line(&products[0], 2, 0, DEFAULT_TAX_PERCENT),
                ],
            },
            CreateOrder {
                customer_id: customers[2].id.clone(),
                items: vec![order_line(&products[1], 10, 10, reduced_iva)],
            },
        ];

        for input in &sample_orders {
            let order = db.purchase_orders().create_order(input).await?;
            println!(
                "  Order {} for {} lines, total {}",
                format_order_no(order.order_no),
                input.items.len(),
                order.total_amount
            );
        }
    }

    let elapsed = start.elapsed();
    println!();
    println!("✓ Generated {} products in {:?}", products.len(), elapsed);
    println!(
        "  Rate: {:.0} rows/second",
        products.len() as f64 / elapsed.as_secs_f64()
    );

    // Verify search
    println!();
    println!("Verifying catalog search...");
    let search_results = db.products().search("gamba", 10).await?;
    println!("  Search 'gamba': {} results", search_results.len());

    let search_results = db.products().search("merluza", 10).await?;
    println!("  Search 'merluza': {} results", search_results.len());

    println!();
    println!("✓ Seed complete!");

    Ok(())
}

/// Initializes the tracing subscriber for structured logging.
///
/// ## Log Levels
/// - `RUST_LOG=debug` - Show debug messages
/// - `RUST_LOG=lonja=trace` - Show trace for lonja crates only
/// - Default: INFO level
fn init_tracing() {
    let filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new("info,lonja=debug,sqlx=warn"));

    tracing_subscriber::fmt().with_env_filter(filter).init();
}

/// Generates a single catalog product with deterministic pricing.
fn generate_product(
    species: &str,
    variant: &str,
    price_addon: i64,
    category_id: &str,
    seed: usize,
) -> Product {
    let now = Utc::now();

    // Base price 4.50 - 32.49 per kg, nudged by the packaging variant
    let base_cents = 450 + ((seed * 37) % 2800) as i64;
    let price_cents = base_cents + price_addon;

    Product {
        id: Uuid::new_v4().to_string(),
        name: format!("{} ({})", species, variant),
        description: None,
        price: Money::new(Decimal::new(price_cents, 2)),
        category_id: Some(category_id.to_string()),
        image_url: None,
        deleted: false,
        created_at: now,
        updated_at: now,
    }
}

/// A vendor buys below the catalog price; 80-94% depending on the vendor.
fn vendor_rate(product: &Product, vendor_idx: usize) -> Money {
    let factor = Decimal::new(80 + (vendor_idx as i64 * 7) % 15, 2);
    Money::new(product.price.amount() * factor)
}

/// Builds an order line at the product's catalog price.
fn order_line(product: &Product, quantity: i64, dto: i64, iva: i64) -> OrderItemInput {
    OrderItemInput {
        product_id: product.id.clone(),
        quantity,
        unit_price: product.price,
        discount_percent: Percent::new(Decimal::from(dto)),
        tax_percent: Percent::new(Decimal::from(iva)),
    }
}
