//! MongoDB connection and the three collections the API works with.

use std::time::Duration;

use configs::DatabaseConfig;
use mongodb::{
    bson::{doc, Document},
    options::{ClientOptions, IndexOptions},
    Client, Collection, Database, IndexModel,
};
use tracing::{info, warn};

use crate::booking;

/// One client, shared by every request. The driver pools connections
/// internally so cloning this is cheap.
#[derive(Clone, Debug)]
pub struct DocumentStore {
    client: Client,
    db: Database,
    pub services: Collection<Document>,
    pub popular_services: Collection<Document>,
    pub bookings: Collection<Document>,
}

pub async fn connect(cfg: &DatabaseConfig) -> anyhow::Result<DocumentStore> {
    let mut options = ClientOptions::parse(&cfg.uri).await?;
    options.server_selection_timeout = Some(Duration::from_secs(cfg.server_selection_timeout_secs));
    if options.app_name.is_none() {
        options.app_name = cfg.app_name.clone().or_else(|| Some("med-consult".to_string()));
    }
    let client = Client::with_options(options)?;
    let db = client.database(&cfg.name);
    let store = DocumentStore {
        services: db.collection(&cfg.services_collection),
        popular_services: db.collection(&cfg.popular_collection),
        bookings: db.collection(&cfg.bookings_collection),
        client,
        db,
    };
    Ok(store)
}

impl DocumentStore {
    /// Round trip to the deployment; used at startup to fail fast.
    pub async fn ping(&self) -> anyhow::Result<()> {
        self.client.database("admin").run_command(doc! { "ping": 1 }, None).await?;
        info!(db = %self.db.name(), "pinged deployment, connection ok");
        Ok(())
    }

    /// Unique compound index backing the one-booking-per-user-and-service rule.
    /// Existing duplicates make the build fail; that is logged and startup
    /// continues with the application-level check only.
    pub async fn ensure_indexes(&self) -> anyhow::Result<()> {
        let keys = booking::UNIQUE_KEY.iter().fold(Document::new(), |mut d, k| {
            d.insert(*k, 1);
            d
        });
        let mut opts = IndexOptions::default();
        opts.unique = Some(true);
        opts.name = Some("userEmail_serviceId_unique".to_string());
        let model = IndexModel::builder().keys(keys).options(opts).build();
        match self.bookings.create_index(model, None).await {
            Ok(res) => info!(index = %res.index_name, "booking uniqueness index ready"),
            Err(e) => warn!(error = %e, "could not create booking uniqueness index; relying on pre-insert check"),
        }
        Ok(())
    }
}
