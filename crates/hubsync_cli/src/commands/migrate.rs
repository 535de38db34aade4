use hubsync::db;
use hubsync::migration::{Migrator, MigratorTrait};

use crate::MigrateAction;

pub(crate) async fn handle_migrate(
    action: MigrateAction,
    database_url: &str,
) -> Result<(), Box<dyn std::error::Error>> {
    let db = db::connect(database_url).await?;

    match action {
        MigrateAction::Up => {
            let pending = Migrator::get_pending_migrations(&db).await?;
            if pending.is_empty() {
                println!("Schema is already up to date.");
            } else {
                println!("Applying {} pending migration(s)...", pending.len());
                Migrator::up(&db, None).await?;
                println!("Done.");
            }
        }
        MigrateAction::Down => {
            println!("Rolling back one migration...");
            Migrator::down(&db, Some(1)).await?;
            println!("Done.");
        }
        MigrateAction::Status => {
            Migrator::status(&db).await?;
        }
        MigrateAction::Fresh => {
            println!("Recreating the schema from scratch...");
            Migrator::fresh(&db).await?;
            println!("Done.");
        }
    }

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn up_applies_everything_and_leaves_nothing_pending() {
        let db = db::connect("sqlite::memory:").await.expect("connect");
        assert!(
            !Migrator::get_pending_migrations(&db)
                .await
                .expect("pending list")
                .is_empty()
        );

        Migrator::up(&db, None).await.expect("migrate up");
        assert!(
            Migrator::get_pending_migrations(&db)
                .await
                .expect("pending list")
                .is_empty()
        );
    }

    #[tokio::test]
    async fn fresh_rebuilds_an_already_migrated_schema() {
        let db = db::connect("sqlite::memory:").await.expect("connect");
        Migrator::up(&db, None).await.expect("migrate up");

        Migrator::fresh(&db).await.expect("fresh");
        assert!(
            Migrator::get_pending_migrations(&db)
                .await
                .expect("pending list")
                .is_empty()
        );
    }
}
