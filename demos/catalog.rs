use ermrest_fetch::{ClientOptions, FetchClient, Method, RequestDescriptor};

/// Prints the schema and table names of an ERMrest catalog.
///
/// Usage: `cargo run --example catalog -- https://host/ermrest/catalog/1/schema`
#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let url = std::env::args()
        .nth(1)
        .ok_or_else(|| anyhow::anyhow!("usage: catalog <schema-url>"))?;

    let client = FetchClient::new().with_options(ClientOptions {
        timeout_ms: 30_000,
        ..ClientOptions::default()
    });

    let request = RequestDescriptor::new(Method::Get, url)
        .with_content_type("application/x-www-form-urlencoded; charset=UTF-8");
    let success = client.fetch(request).await?;
    let document = success
        .json()
        .ok_or_else(|| anyhow::anyhow!("catalog did not return JSON"))?;

    let schemas = document
        .get("schemas")
        .and_then(|schemas| schemas.as_object())
        .into_iter()
        .flatten();
    for (schema, value) in schemas {
        println!("{schema}");
        let tables = value
            .get("tables")
            .and_then(|tables| tables.as_object())
            .into_iter()
            .flatten();
        for (table, _) in tables {
            println!("  {table}");
        }
    }

    Ok(())
}
