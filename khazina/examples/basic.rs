//! Basic example of the Khazina container.

use khazina::args;
use khazina::prelude::*;
use std::sync::Arc;

// === Define your types ===

trait Logger: Send + Sync {
    fn log(&self, msg: &str);
}

struct ConsoleLogger;

impl Logger for ConsoleLogger {
    fn log(&self, msg: &str) {
        println!("[LOG] {msg}");
    }
}

struct Database {
    url: String,
    logger: Arc<dyn Logger>,
}

impl Database {
    fn query(&self, sql: &str) -> String {
        self.logger.log(&format!("Executing: {sql}"));
        format!("Results from {}", self.url)
    }
}

struct UserService {
    db: Arc<Database>,
    request_id: u64,
}

impl UserService {
    fn get_user(&self, id: u64) -> String {
        format!(
            "[request {}] {}",
            self.request_id,
            self.db.query(&format!("SELECT * FROM users WHERE id = {id}"))
        )
    }
}

#[derive(FromAccessor)]
struct Handlers {
    #[khazina(key = "database")]
    db: Arc<Database>,
    mailer: Option<Arc<String>>,
}

fn main() -> Result<()> {
    // Initialize tracing (logging)
    tracing_subscriber::fmt()
        .with_env_filter("khazina_container=debug")
        .init();

    let container = Container::builder()
        // Config — constant, never constructed
        .register(Descriptor::constant("database.url", String::from("postgres://localhost/myapp")))
        // Logger — constant trait object
        .register(Descriptor::constant("logger", Arc::new(ConsoleLogger) as Arc<dyn Logger>))
        // Database — shared, built on first use from a bound key
        .register(
            Descriptor::shared(
                "database",
                Constructor::of::<Database>(|ctx, args| {
                    let logger: Arc<Arc<dyn Logger>> = ctx.resolve_as("logger")?;
                    Ok(Database {
                        url: args.cloned(0)?,
                        logger: (*logger).clone(),
                    })
                }),
            )
            .bind_key("database.url"),
        )
        // UserService — transient, one per request id
        .register(
            Descriptor::transient(
                "users",
                Constructor::of::<UserService>(|_, args| {
                    Ok(UserService {
                        db: args.get(0)?,
                        request_id: args.cloned(1)?,
                    })
                }),
            )
            .bind_key("database"),
        )
        .build()?;

    println!("✅ Container built successfully!");
    println!("{container:?}");

    for request_id in [1u64, 2] {
        let service = container.resolve_with("users", args![request_id])?;
        if let Some(service) = service.downcast_ref::<UserService>() {
            println!("👤 {}", service.get_user(42));
        }
    }

    // Missing keys are reported and skipped
    assert!(container.get("cache").is_none());

    let handlers: Handlers = container.view()?;
    println!("📋 database={}, mailer={:?}", handlers.db.url, handlers.mailer);

    println!("\n🎉 Everything works!");
    Ok(())
}
