use chrono::Utc;
use log::{debug, trace};
use sqlx::{QueryBuilder, SqliteConnection};

use crate::{
    db_types::{GatewayOrderId, NewOrder, Order, OrderStatusType, OrderTransition, PaymentId, TransitionSource},
    traits::StoreError,
};

/// Inserts the order into the database, returning `false` in the second parameter if an order with the same
/// gateway order id already exists. The unique index on `gateway_order_id` does the work, so two concurrent inserts
/// of the same intent still produce a single row.
pub async fn idempotent_insert(order: NewOrder, conn: &mut SqliteConnection) -> Result<(Order, bool), StoreError> {
    let gateway_order_id = order.gateway_order_id.clone();
    let inserted: Option<Order> = sqlx::query_as(
        r#"
            INSERT INTO orders (
                gateway_order_id,
                buyer_id,
                listing_id,
                amount,
                currency,
                status,
                created_at,
                updated_at
            ) VALUES ($1, $2, $3, $4, $5, $6, $7, $7)
            ON CONFLICT (gateway_order_id) DO NOTHING
            RETURNING *;
        "#,
    )
    .bind(order.gateway_order_id)
    .bind(order.buyer_id)
    .bind(order.listing_id)
    .bind(order.amount)
    .bind(order.currency)
    .bind(OrderStatusType::Created)
    .bind(order.created_at)
    .fetch_optional(&mut *conn)
    .await?;
    match inserted {
        Some(order) => {
            debug!("🗃️ Order {} inserted with id {}", order.gateway_order_id, order.id);
            Ok((order, true))
        },
        None => {
            let existing = fetch_order_by_gateway_id(&gateway_order_id, conn).await?.ok_or_else(|| {
                StoreError::DatabaseError(format!("Order {gateway_order_id} conflicted on insert but cannot be read"))
            })?;
            debug!("🗃️ Order {gateway_order_id} already exists with id {}", existing.id);
            Ok((existing, false))
        },
    }
}

pub async fn fetch_order_by_gateway_id(
    id: &GatewayOrderId,
    conn: &mut SqliteConnection,
) -> Result<Option<Order>, sqlx::Error> {
    let order = sqlx::query_as("SELECT * FROM orders WHERE gateway_order_id = $1")
        .bind(id.as_str())
        .fetch_optional(conn)
        .await?;
    Ok(order)
}

/// Conditionally moves the order from `expected` to `new`. This is not atomic on its own, since it issues two
/// statements. Run it inside a transaction and pass `&mut *tx` as the connection.
///
/// The `UPDATE` is the first statement, so the write lock is taken before anything is read.
pub(crate) async fn compare_and_set_status(
    id: &GatewayOrderId,
    expected: OrderStatusType,
    new: OrderStatusType,
    payment_id: Option<&PaymentId>,
    source: TransitionSource,
    conn: &mut SqliteConnection,
) -> Result<Option<Order>, StoreError> {
    let timestamp_column = match new {
        OrderStatusType::ClientVerified => "client_verified_at",
        OrderStatusType::Captured => "captured_at",
        OrderStatusType::Failed => "failed_at",
        OrderStatusType::Created => return Err(StoreError::IllegalTransition { from: expected, to: new }),
    };
    let now = Utc::now();
    let mut builder = QueryBuilder::new("UPDATE orders SET status = ");
    builder.push_bind(new);
    builder.push(", payment_id = COALESCE(");
    builder.push_bind(payment_id.map(|p| p.as_str().to_string()));
    builder.push(", payment_id), updated_at = ");
    builder.push_bind(now);
    builder.push(format!(", {timestamp_column} = "));
    builder.push_bind(now);
    builder.push(" WHERE gateway_order_id = ");
    builder.push_bind(id.as_str());
    builder.push(" AND status = ");
    builder.push_bind(expected);
    builder.push(" RETURNING *");
    trace!("🗃️ Executing query: {}", builder.sql());
    let updated: Option<Order> = builder.build_query_as::<Order>().fetch_optional(&mut *conn).await?;
    let Some(order) = updated else {
        debug!("🗃️ Order {id} was not in the {expected} state. No update was made.");
        return Ok(None);
    };
    insert_transition(id, expected, new, payment_id, source, conn).await?;
    debug!("🗃️ Order {id} moved from {expected} to {new} via {source}");
    Ok(Some(order))
}

async fn insert_transition(
    id: &GatewayOrderId,
    from: OrderStatusType,
    to: OrderStatusType,
    payment_id: Option<&PaymentId>,
    source: TransitionSource,
    conn: &mut SqliteConnection,
) -> Result<(), sqlx::Error> {
    sqlx::query(
        r#"
            INSERT INTO order_transitions (gateway_order_id, from_status, to_status, payment_id, source, created_at)
            VALUES ($1, $2, $3, $4, $5, $6)
        "#,
    )
    .bind(id.as_str())
    .bind(from)
    .bind(to)
    .bind(payment_id.map(|p| p.as_str().to_string()))
    .bind(source)
    .bind(Utc::now())
    .execute(conn)
    .await?;
    Ok(())
}

pub async fn fetch_transitions(
    id: &GatewayOrderId,
    conn: &mut SqliteConnection,
) -> Result<Vec<OrderTransition>, sqlx::Error> {
    let transitions = sqlx::query_as("SELECT * FROM order_transitions WHERE gateway_order_id = $1 ORDER BY id ASC")
        .bind(id.as_str())
        .fetch_all(conn)
        .await?;
    Ok(transitions)
}
