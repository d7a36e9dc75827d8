use clap::Subcommand;
use serde_json::Value;
use uuid::Uuid;

use crate::cli::client::ApiClient;
use crate::cli::utils::{output_empty_collection, output_success, output_value, print_progress, stars, str_field};
use crate::cli::OutputFormat;
use crate::database::models::customer::NewCustomer;

#[derive(Subcommand)]
pub enum CustomerCommands {
    #[command(about = "Create a customer for a KOL")]
    Create {
        #[arg(long, help = "Owning KOL id")]
        kol: Uuid,
        #[arg(long, help = "Customer (clinic owner) name")]
        name: String,
        #[arg(long)]
        shop_name: Option<String>,
        #[arg(long, default_value = "")]
        phone: String,
        #[arg(long, default_value = "")]
        region: String,
        #[arg(long)]
        address: Option<String>,
        #[arg(long, default_value = "")]
        assignee: String,
        #[arg(long, default_value = "")]
        manager: String,
        #[arg(long, help = "Initial status (defaults to pending)")]
        status: Option<String>,
        #[arg(long)]
        notes: Option<String>,
    },

    #[command(about = "Show a customer with its progress")]
    Get {
        #[arg(help = "Customer id")]
        id: Uuid,
    },

    #[command(about = "List a KOL's customers, newest first")]
    List {
        #[arg(help = "KOL id")]
        kol: Uuid,
        #[arg(long)]
        status: Option<String>,
        #[arg(long)]
        region: Option<String>,
    },

    #[command(about = "Customer counts by status and region")]
    Stats {
        #[arg(help = "KOL id")]
        kol: Uuid,
    },

    #[command(about = "Delete a customer and its progress")]
    Delete {
        #[arg(help = "Customer id")]
        id: Uuid,
    },
}

pub async fn handle(cmd: CustomerCommands, client: &ApiClient, output_format: OutputFormat) -> anyhow::Result<()> {
    match cmd {
        CustomerCommands::Create {
            kol,
            name,
            shop_name,
            phone,
            region,
            address,
            assignee,
            manager,
            status,
            notes,
        } => {
            let new = NewCustomer {
                kol_id: kol,
                name,
                shop_name,
                phone,
                region,
                place_address: address,
                assignee,
                manager,
                status,
                notes,
            };
            let created = client.post("/api/customers", Some(&new)).await?;
            output_value(&output_format, &created, |c| {
                println!("✓ Created customer {} ({})", str_field(c, "name"), str_field(c, "id"));
            })
        }
        CustomerCommands::Get { id } => {
            let overview = client.get(&format!("/api/customers/{}", id)).await?;
            output_value(&output_format, &overview, |o| {
                println!("{} [{}] {}", str_field(o, "name"), str_field(o, "status"), str_field(o, "region"));
                print_progress(o);
            })
        }
        CustomerCommands::List { kol, status, region } => {
            let mut path = format!("/api/kols/{}/customers", kol);
            let query: Vec<String> = [("status", status), ("region", region)]
                .into_iter()
                .filter_map(|(k, v)| v.map(|v| format!("{}={}", k, urlencode(&v))))
                .collect();
            if !query.is_empty() {
                path = format!("{}?{}", path, query.join("&"));
            }

            let listed = client.get(&path).await?;
            let rows = listed.as_array().cloned().unwrap_or_default();
            if rows.is_empty() {
                return output_empty_collection(&output_format, "customers", "No customers found");
            }
            output_value(&output_format, &listed, |_| {
                for row in &rows {
                    print_customer_row(row);
                }
            })
        }
        CustomerCommands::Stats { kol } => {
            let stats = client.get(&format!("/api/kols/{}/customers/stats", kol)).await?;
            output_value(&output_format, &stats, |s| {
                println!("Total customers: {}", s["totalCustomers"].as_u64().unwrap_or(0));
                print_counts("By status", &s["statusCounts"]);
                print_counts("By region", &s["regionCounts"]);
            })
        }
        CustomerCommands::Delete { id } => {
            client.delete(&format!("/api/customers/{}", id)).await?;
            output_success(&output_format, &format!("Customer {} deleted", id), None)
        }
    }
}

fn print_customer_row(row: &Value) {
    let summary = &row["summary"];
    println!(
        "{}  {:<20} {:<10} {:<10} {}/{} {}",
        str_field(row, "id"),
        str_field(row, "name"),
        str_field(row, "status"),
        str_field(row, "region"),
        summary["completedStages"].as_u64().unwrap_or(0),
        summary["totalStages"].as_u64().unwrap_or(0),
        stars(summary["achievementLevel"].as_u64().unwrap_or(0)),
    );
}

fn print_counts(title: &str, counts: &Value) {
    println!("{}:", title);
    if let Some(map) = counts.as_object() {
        for (name, count) in map {
            let name = if name.is_empty() { "(none)" } else { name.as_str() };
            println!("  {:<15} {}", name, count);
        }
    }
}

fn urlencode(value: &str) -> String {
    url::form_urlencoded::byte_serialize(value.as_bytes()).collect()
}
