//! Basic container walkthrough: values, singletons, factories, extension.

use carton::{Container, Definition};
use std::sync::Arc;

#[derive(Debug)]
struct AppConfig {
    app_name: String,
    environment: String,
}

#[derive(Debug)]
struct Mailer {
    sender: String,
}

fn main() -> Result<(), Box<dyn std::error::Error>> {
    let mut container = Container::new();

    println!("1. Plain values are returned as stored");
    container.set_value(
        "config",
        AppConfig {
            app_name: "demo".to_string(),
            environment: "develop".to_string(),
        },
    )?;
    let config = container.resolve::<AppConfig>("config")?;
    println!("   config = {config:?}");

    println!("2. Singleton constructors run once and cache");
    container.set(
        "mailer",
        Definition::callable(|c: &mut Container| {
            let config = c.resolve::<AppConfig>("config").expect("registered above");
            println!("   (constructing mailer for {})", config.app_name);
            Mailer {
                sender: format!("noreply@{}.example", config.app_name),
            }
        }),
    )?;
    let first = container.resolve::<Mailer>("mailer")?;
    let second = container.resolve::<Mailer>("mailer")?;
    println!("   sender = {}", first.sender);
    println!("   same instance on every lookup: {}", Arc::ptr_eq(&first, &second));

    println!("3. The resolved entry is frozen now");
    println!(
        "   replacing it fails: {}",
        container.set_value("mailer", 0_i32).unwrap_err()
    );

    println!("4. Factories yield a fresh instance per lookup");
    container.factory(
        "request-id",
        Definition::callable(|c: &mut Container| format!("req-{}", c.stats().factory_creations)),
    )?;
    println!("   {}", container.resolve::<String>("request-id")?);
    println!("   {}", container.resolve::<String>("request-id")?);

    println!("5. Extension decorates unresolved definitions");
    container.set(
        "greeting",
        Definition::callable(|_: &mut Container| String::from("hello")),
    )?;
    container.extend("greeting", |value, _| {
        let greeting = value
            .downcast::<String>()
            .unwrap_or_else(|_| panic!("greeting is a String"));
        Arc::new(format!("{greeting}, world")) as carton::ServiceValue
    })?;
    println!("   greeting = {}", container.resolve::<String>("greeting")?);

    println!("6. Resolution counters");
    let stats = container.stats();
    println!(
        "   resolutions={} hits={} misses={} factories={} hit_rate={:.0}%",
        stats.resolutions,
        stats.cache_hits,
        stats.cache_misses,
        stats.factory_creations,
        stats.hit_rate() * 100.0
    );

    Ok(())
}
