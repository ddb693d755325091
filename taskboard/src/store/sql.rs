use super::{DataStore, Direction, EntityKind, Error, OrderBy, Record};
use async_trait::async_trait;
use sea_orm::sea_query::{Alias, Asterisk, Expr, Order, Query, SimpleExpr, Value};
use sea_orm::{ConnectionTrait, DatabaseConnection, FromQueryResult, JsonValue};

/// [`DataStore`] backed by a SQL database reached through sea-orm.
///
/// Rows are read back as JSON objects, so column values keep whatever shape the backend
/// gives them (SQLite returns booleans as integers, Postgres as booleans).
#[derive(Debug, Clone)]
pub struct SqlStore {
    db: DatabaseConnection,
}

impl SqlStore {
    pub fn new(db: DatabaseConnection) -> Self {
        Self { db }
    }

    /// Connects to the database at `url`.
    pub async fn connect(url: &str) -> Result<Self, Error> {
        let db = sea_orm::Database::connect(url).await?;
        Ok(Self::new(db))
    }

    pub fn connection(&self) -> &DatabaseConnection {
        &self.db
    }
}

/// Converts a JSON column value into a bindable SQL value.
fn to_sql_value(value: &serde_json::Value) -> Value {
    match value {
        serde_json::Value::Null => Value::String(None),
        serde_json::Value::Bool(flag) => Value::from(*flag),
        serde_json::Value::Number(number) => match number.as_i64() {
            Some(integer) => Value::from(integer),
            None => Value::from(number.as_f64().unwrap_or_default()),
        },
        serde_json::Value::String(text) => Value::from(text.clone()),
        nested => Value::from(nested.to_string()),
    }
}

fn id_matches(id: &str) -> SimpleExpr {
    Expr::col(Alias::new("id")).eq(id)
}

#[async_trait]
impl DataStore for SqlStore {
    #[tracing::instrument(skip(self))]
    async fn list(&self, kind: EntityKind, order: OrderBy) -> Result<Vec<Record>, Error> {
        let direction = match order.direction {
            Direction::Ascending => Order::Asc,
            Direction::Descending => Order::Desc,
        };
        let select = Query::select()
            .column(Asterisk)
            .from(Alias::new(kind.table()))
            .order_by(Alias::new(order.column), direction)
            .to_owned();
        let statement = self.db.get_database_backend().build(&select);

        JsonValue::find_by_statement(statement)
            .all(&self.db)
            .await?
            .into_iter()
            .map(|row| match row {
                JsonValue::Object(record) => Ok(record),
                other => Err(Error::MalformedRecord(format!("row {other}"))),
            })
            .collect()
    }

    #[tracing::instrument(skip(self, record))]
    async fn create(&self, kind: EntityKind, record: Record) -> Result<Record, Error> {
        let columns: Vec<Alias> = record.keys().map(|column| Alias::new(column.as_str())).collect();
        let values: Vec<SimpleExpr> = record
            .values()
            .map(|value| SimpleExpr::Value(to_sql_value(value)))
            .collect();

        let mut insert = Query::insert();
        insert.into_table(Alias::new(kind.table())).columns(columns);
        insert
            .values(values)
            .map_err(|err| Error::MalformedRecord(err.to_string()))?;

        let statement = self.db.get_database_backend().build(&insert);
        self.db.execute(statement).await?;
        Ok(record)
    }

    #[tracing::instrument(skip(self, patch))]
    async fn update(&self, kind: EntityKind, id: &str, patch: Record) -> Result<(), Error> {
        let values: Vec<(Alias, SimpleExpr)> = patch
            .iter()
            .filter(|(column, _)| column.as_str() != "id")
            .map(|(column, value)| {
                (
                    Alias::new(column.as_str()),
                    SimpleExpr::Value(to_sql_value(value)),
                )
            })
            .collect();
        if values.is_empty() {
            return Err(Error::MalformedRecord("update without columns".to_string()));
        }

        let update = Query::update()
            .table(Alias::new(kind.table()))
            .values(values)
            .and_where(id_matches(id))
            .to_owned();
        let statement = self.db.get_database_backend().build(&update);

        let result = self.db.execute(statement).await?;
        if result.rows_affected() == 0 {
            return Err(Error::NotFound {
                kind,
                id: id.to_string(),
            });
        }
        Ok(())
    }

    #[tracing::instrument(skip(self))]
    async fn delete(&self, kind: EntityKind, id: &str) -> Result<(), Error> {
        let delete = Query::delete()
            .from_table(Alias::new(kind.table()))
            .and_where(id_matches(id))
            .to_owned();
        let statement = self.db.get_database_backend().build(&delete);

        let result = self.db.execute(statement).await?;
        if result.rows_affected() == 0 {
            return Err(Error::NotFound {
                kind,
                id: id.to_string(),
            });
        }
        Ok(())
    }

    #[tracing::instrument(skip(self))]
    async fn execute(&self, statement: &str) -> Result<(), Error> {
        self.db.execute_unprepared(statement).await?;
        Ok(())
    }
}
