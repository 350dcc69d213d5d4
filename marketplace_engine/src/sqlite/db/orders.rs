use chrono::Utc;
use log::{debug, trace};
use sqlx::SqliteConnection;

use super::first_returned;
use crate::{
    db_types::{NewOrder, Order, OrderId, OrderItem, OrderStatusUpdate, UserId},
    traits::OrderManagementError,
};

/// Inserts the order header and its item snapshots. This is not atomic on its own. Call it inside a transaction,
/// passing `&mut *tx` as the connection, when it must succeed or fail together with other writes.
pub async fn insert_order(order: NewOrder, conn: &mut SqliteConnection) -> Result<Order, OrderManagementError> {
    let NewOrder { id, customer_id, items, shipping_details, total_amount, payment_id, created_at } = order;
    let rows: Vec<Order> = sqlx::query_as(
        r#"
            INSERT INTO orders (
                id,
                customer_id,
                total_amount,
                ship_name,
                ship_email,
                ship_phone,
                ship_address,
                ship_city,
                payment_id,
                created_at,
                updated_at
            ) VALUES ($1, $2, $3, $4, $5, $6, $7, $8, $9, $10, $10)
            RETURNING *;
        "#,
    )
    .bind(id)
    .bind(customer_id)
    .bind(total_amount)
    .bind(shipping_details.name)
    .bind(shipping_details.email)
    .bind(shipping_details.phone)
    .bind(shipping_details.address)
    .bind(shipping_details.city)
    .bind(payment_id)
    .bind(created_at)
    .fetch_all(&mut *conn)
    .await?;
    let mut order = first_returned(rows)?;
    for item in &items {
        insert_item(&order.id, item, conn).await?;
    }
    trace!("🗃️ Order {} stored with {} items", order.id, items.len());
    order.items = items;
    Ok(order)
}

async fn insert_item(order_id: &OrderId, item: &OrderItem, conn: &mut SqliteConnection) -> Result<(), sqlx::Error> {
    sqlx::query(
        "INSERT INTO order_items (order_id, product_id, name, image, quantity, price, seller_id) VALUES ($1, $2, $3, \
         $4, $5, $6, $7)",
    )
    .bind(order_id.as_str())
    .bind(item.product_id.as_str())
    .bind(&item.name)
    .bind(&item.image)
    .bind(item.quantity)
    .bind(item.price)
    .bind(item.seller_id.as_str())
    .execute(conn)
    .await?;
    Ok(())
}

pub async fn fetch_items(order_id: &OrderId, conn: &mut SqliteConnection) -> Result<Vec<OrderItem>, sqlx::Error> {
    let items = sqlx::query_as("SELECT * FROM order_items WHERE order_id = $1 ORDER BY id ASC")
        .bind(order_id.as_str())
        .fetch_all(conn)
        .await?;
    Ok(items)
}

async fn attach_items(mut orders: Vec<Order>, conn: &mut SqliteConnection) -> Result<Vec<Order>, sqlx::Error> {
    for order in &mut orders {
        order.items = fetch_items(&order.id, conn).await?;
    }
    Ok(orders)
}

pub async fn fetch_order(id: &OrderId, conn: &mut SqliteConnection) -> Result<Option<Order>, sqlx::Error> {
    let order: Option<Order> =
        sqlx::query_as("SELECT * FROM orders WHERE id = $1").bind(id.as_str()).fetch_optional(&mut *conn).await?;
    match order {
        Some(mut order) => {
            order.items = fetch_items(&order.id, conn).await?;
            Ok(Some(order))
        },
        None => {
            trace!("🗃️ Order {id} is missing");
            Ok(None)
        },
    }
}

/// The customer's orders, newest first.
pub async fn orders_for_customer(customer: &UserId, conn: &mut SqliteConnection) -> Result<Vec<Order>, sqlx::Error> {
    let orders = sqlx::query_as("SELECT * FROM orders WHERE customer_id = $1 ORDER BY created_at DESC, rowid DESC")
        .bind(customer.as_str())
        .fetch_all(&mut *conn)
        .await?;
    attach_items(orders, conn).await
}

/// Orders that include at least one item sold by `seller`, newest first. Every item of each order is returned, not
/// only the seller's own.
pub async fn orders_for_seller(seller: &UserId, conn: &mut SqliteConnection) -> Result<Vec<Order>, sqlx::Error> {
    let orders = sqlx::query_as(
        r#"
        SELECT * FROM orders
        WHERE id IN (SELECT DISTINCT order_id FROM order_items WHERE seller_id = $1)
        ORDER BY created_at DESC, rowid DESC
        "#,
    )
    .bind(seller.as_str())
    .fetch_all(&mut *conn)
    .await?;
    attach_items(orders, conn).await
}

pub async fn update_order_status(
    id: &OrderId,
    update: OrderStatusUpdate,
    conn: &mut SqliteConnection,
) -> Result<Option<Order>, sqlx::Error> {
    let OrderStatusUpdate { from, status, escrow_status, tracking_number } = update;
    let rows: Vec<Order> = sqlx::query_as(
        r#"
        UPDATE orders SET
            status = $1,
            escrow_status = COALESCE($2, escrow_status),
            tracking_number = $3,
            updated_at = $4
        WHERE id = $5 AND status = $6
        RETURNING *
        "#,
    )
    .bind(status.to_string())
    .bind(escrow_status.map(|e| e.to_string()))
    .bind(tracking_number)
    .bind(Utc::now())
    .bind(id.as_str())
    .bind(from.to_string())
    .fetch_all(&mut *conn)
    .await?;
    match rows.into_iter().next() {
        Some(mut order) => {
            debug!("🗃️ Order {id} is now {status}");
            order.items = fetch_items(&order.id, conn).await?;
            Ok(Some(order))
        },
        None => {
            trace!("🗃️ Order {id} is missing or no longer {from}. Status unchanged");
            Ok(None)
        },
    }
}
