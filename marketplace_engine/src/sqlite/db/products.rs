use chrono::{DateTime, Utc};
use log::{debug, trace};
use sqlx::{sqlite::SqliteRow, FromRow, QueryBuilder, SqliteConnection};

use super::first_returned;
use crate::{
    db_types::{Cents, NewProduct, Product, ProductId, ProductUpdate, UserId},
    product_objects::ProductQueryFilter,
    traits::CatalogError,
};

pub async fn insert_product(product: NewProduct, conn: &mut SqliteConnection) -> Result<Product, CatalogError> {
    let now = Utc::now();
    let rows: Vec<Product> = sqlx::query_as(
        r#"
            INSERT INTO products (
                id,
                seller_id,
                name,
                description,
                price,
                stock,
                category,
                on_special,
                old_price,
                special_end,
                image,
                created_at,
                updated_at
            ) VALUES ($1, $2, $3, $4, $5, $6, $7, $8, $9, $10, $11, $12, $12)
            RETURNING *;
        "#,
    )
    .bind(ProductId::random())
    .bind(product.seller_id)
    .bind(product.name)
    .bind(product.description)
    .bind(product.price)
    .bind(product.stock)
    .bind(product.category)
    .bind(product.on_special)
    .bind(product.old_price)
    .bind(product.special_end)
    .bind(product.image)
    .bind(now)
    .fetch_all(conn)
    .await?;
    Ok(first_returned(rows)?)
}

pub async fn fetch_product(id: &ProductId, conn: &mut SqliteConnection) -> Result<Option<Product>, sqlx::Error> {
    let product = sqlx::query_as("SELECT * FROM products WHERE id = $1").bind(id.as_str()).fetch_optional(conn).await?;
    Ok(product)
}

/// Fetches products according to the criteria in the `ProductQueryFilter`.
///
/// Products are ordered by `created_at`, ascending unless `newest_first` is set.
pub async fn search_products(
    query: ProductQueryFilter,
    conn: &mut SqliteConnection,
) -> Result<Vec<Product>, sqlx::Error> {
    let mut builder = QueryBuilder::new("SELECT * FROM products ");
    if !query.is_empty() {
        builder.push("WHERE ");
    }
    let mut where_clause = builder.separated(" AND ");
    if let Some(seller_id) = query.seller_id {
        where_clause.push("seller_id = ");
        where_clause.push_bind_unseparated(seller_id);
    }
    if query.in_stock_only {
        where_clause.push("stock > 0");
    }
    if query.newest_first {
        builder.push(" ORDER BY created_at DESC, rowid DESC");
    } else {
        builder.push(" ORDER BY created_at ASC, rowid ASC");
    }
    trace!("🗃️ Executing query: {}", builder.sql());
    let products = builder.build_query_as::<Product>().fetch_all(conn).await?;
    trace!("🗃️ Result of search_products: {}", products.len());
    Ok(products)
}

/// Writes only the fields present in `update`, scoped to products owned by `seller`.
pub async fn update_product(
    id: &ProductId,
    seller: &UserId,
    update: ProductUpdate,
    conn: &mut SqliteConnection,
) -> Result<Option<Product>, CatalogError> {
    if update.is_empty() {
        debug!("🗃️ No fields to update for product {id}. Update request skipped.");
        return Err(CatalogError::EmptyUpdate);
    }
    let mut builder = QueryBuilder::new("UPDATE products SET updated_at = ");
    builder.push_bind(Utc::now());
    builder.push(", ");
    let mut set_clause = builder.separated(", ");
    if let Some(name) = update.name {
        set_clause.push("name = ");
        set_clause.push_bind_unseparated(name);
    }
    if let Some(description) = update.description {
        set_clause.push("description = ");
        set_clause.push_bind_unseparated(description);
    }
    if let Some(price) = update.price {
        set_clause.push("price = ");
        set_clause.push_bind_unseparated(price);
    }
    if let Some(stock) = update.stock {
        set_clause.push("stock = ");
        set_clause.push_bind_unseparated(stock);
    }
    if let Some(category) = update.category {
        set_clause.push("category = ");
        set_clause.push_bind_unseparated(category.to_string());
    }
    if let Some(image) = update.image {
        set_clause.push("image = ");
        set_clause.push_bind_unseparated(image);
    }
    if let Some(on_special) = update.on_special {
        set_clause.push("on_special = ");
        set_clause.push_bind_unseparated(on_special);
    }
    if let Some(old_price) = update.old_price {
        set_clause.push("old_price = ");
        set_clause.push_bind_unseparated(old_price);
    }
    if let Some(special_end) = update.special_end {
        set_clause.push("special_end = ");
        set_clause.push_bind_unseparated(special_end);
    }
    builder.push(" WHERE id = ");
    builder.push_bind(id.as_str());
    builder.push(" AND seller_id = ");
    builder.push_bind(seller.as_str());
    builder.push(" RETURNING *");
    trace!("🗃️ Executing query: {}", builder.sql());
    let rows = builder.build().fetch_all(conn).await?;
    let res = rows.first().map(|row: &SqliteRow| Product::from_row(row)).transpose()?;
    Ok(res)
}

pub async fn delete_product(id: &ProductId, seller: &UserId, conn: &mut SqliteConnection) -> Result<bool, sqlx::Error> {
    let result = sqlx::query("DELETE FROM products WHERE id = $1 AND seller_id = $2")
        .bind(id.as_str())
        .bind(seller.as_str())
        .execute(conn)
        .await?;
    Ok(result.rows_affected() > 0)
}

/// Restores the regular price and clears every special-price field. Only touches rows still carrying a special that
/// ended before `now`, so a second concurrent reversal, or a special started after the product was read, is left
/// alone. Returns the number of rows changed.
pub async fn revert_special_price(
    id: &ProductId,
    restored_price: Cents,
    now: DateTime<Utc>,
    conn: &mut SqliteConnection,
) -> Result<u64, sqlx::Error> {
    let result = sqlx::query(
        "UPDATE products SET price = $1, on_special = FALSE, old_price = 0, special_end = NULL, updated_at = $2 \
         WHERE id = $3 AND on_special = TRUE AND special_end IS NOT NULL AND special_end < $2",
    )
    .bind(restored_price)
    .bind(now)
    .bind(id.as_str())
    .execute(conn)
    .await?;
    Ok(result.rows_affected())
}

/// Decrements the product's stock by `quantity`, but only if at least that much stock remains. Returns `false` if the
/// product does not exist or does not have enough stock, in which case nothing was changed.
pub async fn reserve_stock(id: &ProductId, quantity: i64, conn: &mut SqliteConnection) -> Result<bool, sqlx::Error> {
    let result = sqlx::query("UPDATE products SET stock = stock - $1 WHERE id = $2 AND stock >= $1")
        .bind(quantity)
        .bind(id.as_str())
        .execute(conn)
        .await?;
    Ok(result.rows_affected() == 1)
}
