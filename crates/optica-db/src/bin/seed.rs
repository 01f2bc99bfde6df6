//! # Seed Data Generator
//!
//! Populates the database with demo data for development.
//!
//! ## Usage
//! ```bash
//! # 20 clients (default)
//! cargo run -p optica-db --bin seed
//!
//! # Custom amount and database path
//! cargo run -p optica-db --bin seed -- --count 200 --db ./data/optica.db
//! ```
//!
//! ## Generated Data
//! For each client:
//! - A prescription for both eyes
//! - One or two service orders with a frame, lenses and a line item
//! - Zero to two payments per order (some orders end up fully paid)
//! - Every third client gets an appointment on today's agenda

use chrono::{Duration, NaiveDate, Utc};
use optica_core::schedule::{local_day, slot_starts, utc_offset};
use optica_core::{
    ClientInput, EyePrescription, NewAppointment, NewPayment, NewSale, NewSaleItem,
    PaymentMethod, ProfileInput,
};
use optica_db::{Database, DbConfig};
use std::env;

const FIRST_NAMES: &[&str] = &[
    "Ana", "Bruno", "Carla", "Diego", "Eduarda", "Felipe", "Gabriela", "Henrique", "Isabela",
    "João", "Larissa", "Marcos", "Natália", "Otávio", "Paula", "Rafael", "Sofia", "Thiago",
];

const LAST_NAMES: &[&str] = &[
    "Souza", "Oliveira", "Santos", "Lima", "Pereira", "Costa", "Almeida", "Ferreira", "Rocha",
];

/// (description, unit price in centavos)
const ITEMS: &[(&str, i64)] = &[
    ("Lente monofocal antirreflexo", 35_000),
    ("Lente multifocal", 89_000),
    ("Lente fotossensível", 52_000),
    ("Estojo + flanela", 3_500),
    ("Lente de contato (caixa)", 18_000),
];

const METHODS: &[PaymentMethod] = &[
    PaymentMethod::Cash,
    PaymentMethod::Pix,
    PaymentMethod::Card,
    PaymentMethod::Installment,
];

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    let args: Vec<String> = env::args().collect();

    let mut count: usize = 20;
    let mut db_path = String::from("./optica_dev.db");

    let mut i = 1;
    while i < args.len() {
        match args[i].as_str() {
            "--count" | "-c" => {
                if i + 1 < args.len() {
                    count = args[i + 1].parse().unwrap_or(20);
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
                println!("Optical shop seed data generator");
                println!();
                println!("Usage: seed [OPTIONS]");
                println!();
                println!("Options:");
                println!("  -c, --count <N>    Number of clients to generate (default: 20)");
                println!("  -d, --db <PATH>    Database file path (default: ./optica_dev.db)");
                println!("  -h, --help         Show this help message");
                return Ok(());
            }
            _ => {}
        }
        i += 1;
    }

    println!("Seeding {} with {} clients", db_path, count);

    let db = Database::new(DbConfig::new(&db_path)).await?;

    if !db.clients().list().await?.is_empty() {
        println!("Database already has clients; skipping seed.");
        println!("Delete the database file to regenerate.");
        return Ok(());
    }

    db.profile()
        .save(ProfileInput {
            fantasy_name: Some("Ótica Boa Visão".to_string()),
            cnpj: Some("12.345.678/0001-90".to_string()),
            contact_phone: Some("(11) 3333-4444".to_string()),
        })
        .await?;

    let offset = utc_offset(-180)?;
    let today = local_day(Utc::now(), offset);
    let slots = slot_starts(today, offset);

    let start = std::time::Instant::now();
    let (mut sales, mut payments, mut appointments) = (0, 0, 0);

    for seed in 0..count {
        let client = db.clients().create(client_input(seed, today)).await?;

        for order in 0..(1 + seed % 2) {
            let sale = db.sales().create(sale_input(&client.id, &client.name, seed + order, today)).await?;
            sales += 1;

            // 0, 1 or 2 payments; the second one settles the order
            let instalments = (seed + order) % 3;
            let mut pending = sale.pending_amount_cents;
            for n in 0..instalments {
                let amount = if n + 1 == instalments { pending } else { pending / 2 };
                if amount <= 0 {
                    break;
                }
                db.sales()
                    .add_payment(
                        &sale.id,
                        NewPayment {
                            amount_cents: amount,
                            payment_method: METHODS[(seed + n) % 3],
                            notes: None,
                        },
                    )
                    .await?;
                pending -= amount;
                payments += 1;
            }
        }

        if seed % 3 == 0 {
            if let Some((_, at)) = slots.get((seed / 3 * 5) % slots.len()) {
                let booked = db
                    .appointments()
                    .create(NewAppointment {
                        client_id: client.id.clone(),
                        date: *at,
                        notes: Some("Exame de vista".to_string()),
                    })
                    .await;
                if booked.is_ok() {
                    appointments += 1;
                }
            }
        }
    }

    println!(
        "Generated {} clients, {} sales, {} payments, {} appointments in {:?}",
        count,
        sales,
        payments,
        appointments,
        start.elapsed()
    );

    let totals = db.sales().totals().await?;
    println!(
        "Totals: {} sales, {} paid, {} pending (centavos)",
        totals.total_count, totals.total_paid, totals.total_pending
    );

    Ok(())
}

fn client_input(seed: usize, today: NaiveDate) -> ClientInput {
    let first = FIRST_NAMES[seed % FIRST_NAMES.len()];
    let last = LAST_NAMES[(seed / FIRST_NAMES.len() + seed) % LAST_NAMES.len()];
    let spherical = -0.25 * ((seed % 16) as f64);

    let eye = |cyl: f64| EyePrescription {
        spherical: Some(format!("{spherical:+.2}")),
        cylindrical: Some(format!("{cyl:+.2}")),
        axis: Some(format!("{}", (seed * 15) % 180)),
        addition: (seed % 4 == 0).then(|| "+2.00".to_string()),
        dnp: Some(format!("{}", 30 + seed % 5)),
        co: None,
    };

    ClientInput {
        name: format!("{first} {last}"),
        phone: format!("(11) 9{:04}-{:04}", 1000 + seed % 9000, (seed * 37) % 10_000),
        email: Some(format!("{}.{}{}@example.com", first.to_lowercase(), last.to_lowercase(), seed)),
        cpf: None,
        address: None,
        birth_date: today.checked_sub_signed(Duration::days(365 * (20 + (seed % 50) as i64))),
        right_eye: eye(-0.50),
        left_eye: eye(-0.75),
        notes: None,
    }
}

fn sale_input(client_id: &str, client_name: &str, seed: usize, today: NaiveDate) -> NewSale {
    let (description, unit_price_cents) = ITEMS[seed % ITEMS.len()];
    let payment_method = METHODS[seed % METHODS.len()];

    NewSale {
        client_id: client_id.to_string(),
        client_name: client_name.to_string(),
        items: vec![NewSaleItem {
            description: description.to_string(),
            quantity: 1 + (seed % 2) as i64,
            unit_price_cents,
            total_cents: None,
        }],
        frame_value_cents: Some(20_000 + (seed % 5) as i64 * 5_000),
        lens_value_cents: None,
        discount_cents: (seed % 4 == 0).then_some(2_000),
        subtotal_cents: None,
        total_cents: None,
        paid_amount_cents: 0,
        pending_amount_cents: None,
        status: None,
        payment_method,
        installments: (payment_method == PaymentMethod::Installment).then_some(3),
        delivery_date: today.checked_add_signed(Duration::days(7)),
        notes: None,
        service_order_number: None,
    }
}
