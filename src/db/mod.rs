mod search;

use sqlx::postgres::{PgConnection, Postgres};
use sqlx::{Connection, Transaction};
use tracing::{debug, info, warn};

use crate::config::Config;
use crate::error::{classify, RepoResult, RepositoryError};
use crate::models::{Client, ClientSummary, NewClient, Phone, PhoneOutcome};

pub use search::SearchField;

const CREATE_CLIENT_TABLE: &str = r#"
    CREATE TABLE IF NOT EXISTS client (
        client_id SERIAL PRIMARY KEY,
        first_name varchar(100),
        last_name varchar(100),
        email varchar(100),
        CONSTRAINT email_regexp CHECK (email ~ '^[\w\-\.]+@[\w\-\.]+\.[\w]+$')
    )
"#;

const CREATE_CLIENT_PHONE_TABLE: &str = r#"
    CREATE TABLE IF NOT EXISTS client_phone (
        client_phone_id SERIAL PRIMARY KEY,
        client_id integer REFERENCES client(client_id),
        phone varchar(50),
        CONSTRAINT phone_regexp CHECK (phone ~ '^[+]?\d?\(?\d{1,4}\)?[-\s./\d]*$')
    )
"#;

/// Clients and their phone numbers, backed by a single PostgreSQL connection
///
/// Every method takes `&mut self`, so one repository serves one caller at a time.
/// The connection is closed when the repository is dropped; [`close`](Self::close)
/// does the same but lets the server see a clean terminate.
pub struct ClientRepository {
    conn: PgConnection,
}

impl ClientRepository {
    pub async fn connect(database: &str, user: &str, password: &str, host: &str) -> RepoResult<Self> {
        Self::from_config(&Config::new(database, user, password, host)).await
    }

    pub async fn from_config(config: &Config) -> RepoResult<Self> {
        let conn = PgConnection::connect_with(&config.connect_options()).await?;
        debug!(host = %config.host, database = %config.database, "Connected to client database");

        Ok(Self { conn })
    }

    pub async fn close(self) -> RepoResult<()> {
        self.conn.close().await?;
        Ok(())
    }

    /// Create the `client` and `client_phone` tables if they don't exist yet
    pub async fn initialize_schema(&mut self) -> RepoResult<()> {
        let mut tx = self.conn.begin().await?;

        sqlx::query(CREATE_CLIENT_TABLE).execute(&mut *tx).await?;
        sqlx::query(CREATE_CLIENT_PHONE_TABLE).execute(&mut *tx).await?;

        tx.commit().await?;

        info!("Client schema ready");
        Ok(())
    }

    /// Add a client, then each of `phones`
    ///
    /// The client row is committed before any phone is touched. A phone that
    /// fails the format check is rolled back on its own and reported as
    /// [`PhoneOutcome::Rejected`]; any other failure of that one insert (a
    /// number too long for the column, say) becomes [`PhoneOutcome::Failed`].
    /// Either way the client and the other phones are kept.
    /// An email failing its check means no client at all and a
    /// [`RepositoryError::Validation`].
    pub async fn add_client<I, S>(
        &mut self,
        first_name: &str,
        last_name: &str,
        email: Option<&str>,
        phones: I,
    ) -> RepoResult<NewClient>
    where
        I: IntoIterator<Item = S>,
        S: AsRef<str>,
    {
        // Start the client transaction
        let mut tx = self.conn.begin().await?;

        let inserted = sqlx::query_scalar::<_, i32>(
            r#"
            INSERT INTO client (first_name, last_name, email)
            VALUES ($1, $2, $3)
            RETURNING client_id
            "#,
        )
        .bind(first_name)
        .bind(last_name)
        .bind(email)
        .fetch_one(&mut *tx)
        .await;

        let client_id = match inserted {
            Ok(id) => id,
            Err(err) => {
                rollback(tx).await;
                let err = classify(err);
                if err.is_validation() {
                    warn!(email = ?email, "Client rejected, email has an invalid format");
                }
                return Err(err);
            }
        };

        // Commit the client before touching phones
        tx.commit().await?;
        info!(client_id, "Client added");

        let mut phones = phones.into_iter().peekable();
        let mut outcomes = Vec::new();

        if phones.peek().is_some() {
            let mut tx = self.conn.begin().await?;

            // Each phone lives or dies on its own savepoint
            for phone in phones {
                let phone = phone.as_ref();
                let outcome = match insert_phone(&mut *tx, client_id, phone).await? {
                    Ok(client_phone_id) => PhoneOutcome::Inserted {
                        client_phone_id,
                        phone: phone.to_string(),
                    },
                    Err(RepositoryError::Validation { constraint, message }) => {
                        warn!(client_id, phone, "Phone skipped, invalid format");
                        PhoneOutcome::Rejected {
                            phone: phone.to_string(),
                            constraint,
                            reason: message,
                        }
                    }
                    Err(err) => {
                        warn!(client_id, phone, error = %err, "Phone skipped, insert failed");
                        PhoneOutcome::Failed {
                            phone: phone.to_string(),
                            error: err.to_string(),
                        }
                    }
                };
                outcomes.push(outcome);
            }

            // Commit every phone that went in
            tx.commit().await?;
        }

        Ok(NewClient {
            client_id,
            phones: outcomes,
        })
    }

    /// Attach one phone number to an existing client, returning its id
    pub async fn add_client_phone(&mut self, client_id: i32, phone: &str) -> RepoResult<i32> {
        let mut tx = self.conn.begin().await?;
        let inserted = insert_phone(&mut *tx, client_id, phone).await?;
        tx.commit().await?;

        match &inserted {
            Ok(client_phone_id) => debug!(client_id, client_phone_id, "Phone added"),
            Err(err) if err.is_validation() => warn!(client_id, phone, "Phone rejected, invalid format"),
            Err(_) => {}
        }

        inserted
    }

    /// Replace name and email of a client; returns the number of rows changed (0 or 1)
    pub async fn update_client(
        &mut self,
        client_id: i32,
        first_name: &str,
        last_name: &str,
        email: Option<&str>,
    ) -> RepoResult<u64> {
        let mut tx = self.conn.begin().await?;

        let updated = sqlx::query(
            r#"
            UPDATE client
            SET first_name = $1, last_name = $2, email = $3
            WHERE client_id = $4
            "#,
        )
        .bind(first_name)
        .bind(last_name)
        .bind(email)
        .bind(client_id)
        .execute(&mut *tx)
        .await;

        let rows = match updated {
            Ok(result) => result.rows_affected(),
            Err(err) => {
                rollback(tx).await;
                return Err(classify(err));
            }
        };

        tx.commit().await?;
        debug!(client_id, rows, "Client updated");

        Ok(rows)
    }

    pub async fn delete_client_phone(&mut self, client_phone_id: i32) -> RepoResult<u64> {
        let mut tx = self.conn.begin().await?;

        let rows = sqlx::query("DELETE FROM client_phone WHERE client_phone_id = $1")
            .bind(client_phone_id)
            .execute(&mut *tx)
            .await?
            .rows_affected();

        tx.commit().await?;
        debug!(client_phone_id, rows, "Phone deleted");

        Ok(rows)
    }

    /// Delete a client together with all of its phones
    pub async fn delete_client(&mut self, client_id: i32) -> RepoResult<u64> {
        let mut tx = self.conn.begin().await?;

        // Phones first, nothing cascades at the schema level
        let phones = sqlx::query("DELETE FROM client_phone WHERE client_id = $1")
            .bind(client_id)
            .execute(&mut *tx)
            .await?
            .rows_affected();

        // Finally delete the client
        let rows = sqlx::query("DELETE FROM client WHERE client_id = $1")
            .bind(client_id)
            .execute(&mut *tx)
            .await?
            .rows_affected();

        tx.commit().await?;

        if rows > 0 {
            info!(client_id, phones, "Client deleted");
        }

        Ok(rows)
    }

    /// Find clients whose `field` equals `value` exactly
    ///
    /// `field` is one of `name`, `surname`, `email` or `phone`, in any case.
    /// Anything else is a [`RepositoryError::InvalidField`] and no query is run.
    pub async fn find_client(&mut self, field: &str, value: &str) -> RepoResult<Vec<Client>> {
        let field = field.parse::<SearchField>()?;
        self.find_client_by(field, value).await
    }

    pub async fn find_client_by(&mut self, field: SearchField, value: &str) -> RepoResult<Vec<Client>> {
        // Only the static column from the allow-list is spliced into the query
        let query = format!(
            r#"
            SELECT DISTINCT c.client_id, c.first_name, c.last_name, c.email
            FROM client c
            LEFT JOIN client_phone cp ON c.client_id = cp.client_id
            WHERE {} = $1
            ORDER BY c.client_id
            "#,
            field.column()
        );

        let clients = sqlx::query_as::<_, Client>(&query)
            .bind(value)
            .fetch_all(&mut self.conn)
            .await?;

        debug!(%field, count = clients.len(), "Client search finished");
        Ok(clients)
    }

    /// Every client once, with its phones joined into one string
    pub async fn list_all_clients(&mut self) -> RepoResult<Vec<ClientSummary>> {
        let clients = sqlx::query_as::<_, ClientSummary>(
            r#"
            SELECT c.client_id, c.first_name, c.last_name, c.email,
                   string_agg(cp.phone, ', ' ORDER BY cp.client_phone_id) AS phones
            FROM client c
            LEFT JOIN client_phone cp ON c.client_id = cp.client_id
            GROUP BY c.client_id, c.first_name, c.last_name, c.email
            ORDER BY c.client_id
            "#,
        )
        .fetch_all(&mut self.conn)
        .await?;

        Ok(clients)
    }

    pub async fn client_phones(&mut self, client_id: i32) -> RepoResult<Vec<Phone>> {
        let phones = sqlx::query_as::<_, Phone>(
            r#"
            SELECT client_phone_id, client_id, phone
            FROM client_phone
            WHERE client_id = $1
            ORDER BY client_phone_id
            "#,
        )
        .bind(client_id)
        .fetch_all(&mut self.conn)
        .await?;

        Ok(phones)
    }
}

/// Insert a phone inside a savepoint so a failed insert only undoes this row
///
/// The outer result carries savepoint failures, which leave the surrounding
/// transaction unusable. The inner one is the insert itself.
async fn insert_phone(
    conn: &mut PgConnection,
    client_id: i32,
    phone: &str,
) -> RepoResult<RepoResult<i32>> {
    let mut savepoint = conn.begin().await?;

    let inserted = sqlx::query_scalar::<_, i32>(
        r#"
        INSERT INTO client_phone (client_id, phone)
        VALUES ($1, $2)
        RETURNING client_phone_id
        "#,
    )
    .bind(client_id)
    .bind(phone)
    .fetch_one(&mut *savepoint)
    .await;

    match inserted {
        Ok(id) => {
            savepoint.commit().await?;
            Ok(Ok(id))
        }
        Err(err) => {
            savepoint.rollback().await?;
            Ok(Err(classify(err)))
        }
    }
}

/// Roll back after a failed statement without hiding that statement's error
async fn rollback(tx: Transaction<'_, Postgres>) {
    if let Err(err) = tx.rollback().await {
        warn!(error = %err, "Rollback failed");
    }
}

/// Connect and make sure the schema exists
pub async fn init(config: &Config) -> RepoResult<ClientRepository> {
    let mut repo = ClientRepository::from_config(config).await?;
    repo.initialize_schema().await?;

    Ok(repo)
}
