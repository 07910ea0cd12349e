//! Provider and token-registry composition.
//!
//! Shows a library shipping its services as a `ServiceProvider` bundle and
//! an application wiring typed lookups through a `TokenRegistry`.

use carton::{Container, ContainerError, Definition, ServiceProvider, TokenRegistry};

#[derive(Debug)]
struct DatabaseConfig {
    url: String,
    pool_size: u32,
}

#[derive(Debug)]
struct DatabasePool {
    url: String,
    connections: u32,
}

/// Everything the storage layer needs, registered as one unit.
struct StorageProvider;

impl ServiceProvider for StorageProvider {
    fn register(&self, container: &mut Container) -> Result<(), ContainerError> {
        container.set_value(
            "db.config",
            DatabaseConfig {
                url: "postgres://localhost/demo".to_string(),
                pool_size: 8,
            },
        )?;
        container.set(
            "db.pool",
            Definition::callable(|c: &mut Container| {
                let config = c
                    .resolve::<DatabaseConfig>("db.config")
                    .expect("registered by this provider");
                DatabasePool {
                    url: config.url.clone(),
                    connections: config.pool_size,
                }
            }),
        )
    }
}

fn main() -> Result<(), Box<dyn std::error::Error>> {
    let mut container = Container::new();

    println!("1. Install the provider bundle");
    container.register(&StorageProvider)?;
    println!(
        "   registered: {:?}",
        container.keys().map(ToString::to_string).collect::<Vec<_>>()
    );

    println!("2. Bind types to their preferred identifiers");
    let mut tokens = TokenRegistry::new();
    tokens.bind::<DatabaseConfig>("db.config");
    tokens.bind::<DatabasePool>("db.pool");

    println!("3. Auto-wire through the bindings");
    let pool = tokens.resolve::<DatabasePool>(&mut container)?;
    println!("   pool = {pool:?}");

    println!("4. The pool is a cached singleton from here on");
    let again = tokens.resolve::<DatabasePool>(&mut container)?;
    println!(
        "   same instance: {}",
        std::sync::Arc::ptr_eq(&pool, &again)
    );

    Ok(())
}
