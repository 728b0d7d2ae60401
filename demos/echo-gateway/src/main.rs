//! Echo gateway demo
//!
//! Serves two services on one endpoint:
//!
//! - `Echo`: `say`, `upper`, `whoami`
//! - `billing.Invoice`: `total`, `void` (plus a private `audit` and the
//!   reserved constructor, both refused)
//!
//! Configuration comes from `RPCGATE_*` environment variables; log level
//! from `RUST_LOG`.
//!
//! Run with: cargo run -p echo-gateway
//!
//! Try:
//!
//! ```text
//! curl -s localhost:8080 -d '{"method":"Echo.say","params":["hi"],"omitToken":true}'
//! curl -s localhost:8080 -d '{"method":"billing.Invoice.total","params":[[{"price":2.5,"qty":4}],0.2],"token":"acme"}'
//! curl -s localhost:8080 -d '{"method":"billing.Invoice.audit","params":[],"token":"acme"}'
//! ```

use rpcgate_core::{ObservabilityConfig, ServiceError};
use rpcgate_server::{Arity, GatewayConfig, MemberKind, ServerBuilder, Service, Visibility};
use serde::{Deserialize, Serialize};
use serde_json::Value;

#[derive(Debug, Deserialize)]
struct LineItem {
    price: f64,
    qty: u32,
}

#[derive(Debug, Serialize)]
struct Total {
    customer: String,
    net: f64,
    gross: f64,
}

struct Invoice {
    customer: String,
}

fn echo() -> Service<Option<String>> {
    Service::builder("Echo", |token| Ok(token.map(str::to_owned)))
        .method("say", Arity::exact(1), |_: &Option<String>, params| {
            params.required::<Value>(0)
        })
        .method("upper", Arity::exact(1), |_: &Option<String>, params| {
            let text: String = params.required(0)?;
            Ok(text.to_uppercase())
        })
        .method("whoami", Arity::exact(0), |token: &Option<String>, _| Ok(token.clone()))
        .build()
}

fn invoice() -> Service<Invoice> {
    Service::builder("billing::Invoice", |token| match token {
        Some(customer) => Ok(Invoice {
            customer: customer.to_string(),
        }),
        None => Err(ServiceError::new(401, "Customer token required")),
    })
    .method("total", Arity::with_optional(1, 1), |invoice: &Invoice, params| {
        let items: Vec<LineItem> = params.required(0)?;
        let tax: f64 = params.optional(1)?.unwrap_or(0.0);
        let net: f64 = items.iter().map(|item| item.price * f64::from(item.qty)).sum();

        tracing::debug!(customer = %invoice.customer, items = items.len(), net, "Invoice totalled");
        Ok(Total {
            customer: invoice.customer.clone(),
            net,
            gross: net * (1.0 + tax),
        })
    })
    .method("void", Arity::exact(1), |invoice: &Invoice, params| {
        let number: u64 = params.required(0)?;
        Err::<(), _>(ServiceError::new(
            409,
            format!("Invoice {} of {} is already settled", number, invoice.customer),
        ))
    })
    .declare("audit", MemberKind::Instance, Visibility::Private, Arity::exact(0))
    .build()
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let config = GatewayConfig::from_env()?;
    let observability = ObservabilityConfig::new("echo-gateway").with_log_level("info");

    let server = ServerBuilder::new()
        .config(config)
        .service(echo())
        .service(invoice())
        .with_observability(observability)
        .build()
        .await?;

    let addr = server.local_addr()?;
    println!("Echo gateway listening on http://{}", addr);
    println!("Services: Echo, billing.Invoice");

    tokio::select! {
        result = server.run() => result?,
        _ = tokio::signal::ctrl_c() => {
            tracing::info!("Shutting down");
        }
    }

    rpcgate_core::shutdown_observability();
    Ok(())
}
