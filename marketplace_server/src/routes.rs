//! Request handler definitions
//!
//! Define each route and its handler here. Handlers stay thin: they pull the caller out of the token, call one
//! engine API, and let `ServerError` turn engine errors into status codes.
//!
//! A note about performance:
//! Since each worker thread processes its requests sequentially, handlers which block the current thread will cause the
//! current worker to stop processing new requests. Every database call is therefore awaited, never blocked on.
use actix_web::{get, web, HttpResponse, Responder};
use log::*;
use marketplace_engine::{
    db_types::{ProductUpdate, Role},
    order_objects::PlaceOrderRequest,
    traits::{OrderManagement, ProductCatalog, SellerManagement},
    OrderPlacementApi,
    OrderQueryApi,
    ProductApi,
    SellerApi,
};

use crate::{
    auth::JwtClaims,
    data_objects::{JsonResponse, NewProductRequest, OrderStatusRequest},
    errors::ServerError,
};

// Web-actix cannot handle generics in handlers, so it's implemented manually using the `route!` macro
#[macro_export]
macro_rules! route {
    ($name:ident => $method:ident $path:literal impl $($bounds:path),+ where requires [$($roles:expr),+]) => {
        paste::paste! { pub struct [<$name:camel Route>]<A>(core::marker::PhantomData<fn() -> A>);}
        paste::paste! { impl<A> [<$name:camel Route>]<A> {
            #[allow(clippy::new_without_default)]
            pub fn new() -> Self {
                Self(core::marker::PhantomData::<fn() -> A>)
            }
        }}
        paste::paste! { impl<A> actix_web::dev::HttpServiceFactory for [<$name:camel Route>]<A>
        where
            A: $($bounds +)+ 'static,
        {
            fn register(self, config: &mut actix_web::dev::AppService) {
                let res = actix_web::Resource::new($path)
                    .name(stringify!($name))
                    .guard(actix_web::guard::$method())
                    .to($name::<A>)
                    .wrap($crate::middleware::AclMiddlewareFactory::new(&[$($roles),+]));
                actix_web::dev::HttpServiceFactory::register(res, config);
            }
        }}
    };

    ($name:ident => $method:ident $path:literal impl $($bounds:path),+) => {
        paste::paste! { pub struct [<$name:camel Route>]<A>(core::marker::PhantomData<fn() -> A>);}
        paste::paste! { impl<A> [<$name:camel Route>]<A> {
            #[allow(clippy::new_without_default)]
            pub fn new() -> Self {
                Self(core::marker::PhantomData::<fn() -> A>)
            }
        }}
        paste::paste! { impl<A> actix_web::dev::HttpServiceFactory for [<$name:camel Route>]<A>
        where
            A: $($bounds +)+ 'static,
        {
            fn register(self, config: &mut actix_web::dev::AppService) {
                let res = actix_web::Resource::new($path)
                    .name(stringify!($name))
                    .guard(actix_web::guard::$method())
                    .to($name::<A>);
                actix_web::dev::HttpServiceFactory::register(res, config);
            }
        }}
    };
}

// ----------------------------------------------   Health  ----------------------------------------------------
#[get("/health")]
pub async fn health() -> impl Responder {
    trace!("💻️ Received health check request");
    HttpResponse::Ok().body("👍️\n")
}

//----------------------------------------------   Shop  ----------------------------------------------------
route!(shop_products => Get "/products" impl ProductCatalog);
/// The public storefront: every product with stock, with lapsed specials reverted.
pub async fn shop_products<A>(api: web::Data<ProductApi<A>>) -> Result<HttpResponse, ServerError>
where A: ProductCatalog {
    trace!("💻️ Received shop listing request");
    let products = api.shop_products().await?;
    Ok(HttpResponse::Ok().json(products))
}

route!(shop_product => Get "/products/{id}" impl ProductCatalog);
pub async fn shop_product<A>(path: web::Path<String>, api: web::Data<ProductApi<A>>) -> Result<HttpResponse, ServerError>
where A: ProductCatalog {
    let id = path.into_inner();
    trace!("💻️ Received shop product request for {id}");
    let product = api.shop_product(&id).await?;
    Ok(HttpResponse::Ok().json(product))
}

//----------------------------------------------   Orders  ----------------------------------------------------
route!(place_order => Post "/orders" impl ProductCatalog, OrderManagement where requires [Role::Customer]);
/// Checkout. The body is a cart and shipping details. Any total in the body is ignored; the response carries the
/// total the server computed.
pub async fn place_order<A>(
    claims: JwtClaims,
    body: web::Json<PlaceOrderRequest>,
    api: web::Data<OrderPlacementApi<A>>,
) -> Result<HttpResponse, ServerError>
where
    A: ProductCatalog + OrderManagement,
{
    debug!("💻️ Order request from {} with {} lines", claims.sub, body.items.len());
    let order = api.place_order(&claims.sub, body.into_inner()).await?;
    Ok(HttpResponse::Created().json(order))
}

route!(my_orders => Get "/orders/me" impl OrderManagement where requires [Role::Customer]);
pub async fn my_orders<A>(claims: JwtClaims, api: web::Data<OrderQueryApi<A>>) -> Result<HttpResponse, ServerError>
where A: OrderManagement {
    trace!("💻️ Order history request from {}", claims.sub);
    let orders = api.orders_for_customer(&claims.sub).await?;
    Ok(HttpResponse::Ok().json(orders))
}

//----------------------------------------------   Seller products  ------------------------------------------------
route!(seller_products => Get "/seller/products" impl ProductCatalog, SellerManagement where requires [Role::Seller]);
pub async fn seller_products<A>(
    claims: JwtClaims,
    sellers: web::Data<SellerApi<A>>,
    api: web::Data<ProductApi<A>>,
) -> Result<HttpResponse, ServerError>
where
    A: ProductCatalog + SellerManagement,
{
    sellers.record_activity(&claims.sub).await?;
    let products = api.seller_products(&claims.sub).await?;
    Ok(HttpResponse::Ok().json(products))
}

route!(create_product => Post "/seller/products" impl ProductCatalog, SellerManagement where requires [Role::Seller]);
pub async fn create_product<A>(
    claims: JwtClaims,
    body: web::Json<NewProductRequest>,
    sellers: web::Data<SellerApi<A>>,
    api: web::Data<ProductApi<A>>,
) -> Result<HttpResponse, ServerError>
where
    A: ProductCatalog + SellerManagement,
{
    sellers.record_activity(&claims.sub).await?;
    let product = body.into_inner().into_new_product(claims.sub);
    let product = api.create_product(product).await?;
    Ok(HttpResponse::Created().json(product))
}

route!(update_product => Put "/seller/products/{id}" impl ProductCatalog, SellerManagement where requires [Role::Seller]);
pub async fn update_product<A>(
    claims: JwtClaims,
    path: web::Path<String>,
    body: web::Json<ProductUpdate>,
    sellers: web::Data<SellerApi<A>>,
    api: web::Data<ProductApi<A>>,
) -> Result<HttpResponse, ServerError>
where
    A: ProductCatalog + SellerManagement,
{
    sellers.record_activity(&claims.sub).await?;
    let product = api.update_product(&claims.sub, &path.into_inner(), body.into_inner()).await?;
    Ok(HttpResponse::Ok().json(product))
}

route!(delete_product => Delete "/seller/products/{id}" impl ProductCatalog, SellerManagement where requires [Role::Seller]);
pub async fn delete_product<A>(
    claims: JwtClaims,
    path: web::Path<String>,
    sellers: web::Data<SellerApi<A>>,
    api: web::Data<ProductApi<A>>,
) -> Result<HttpResponse, ServerError>
where
    A: ProductCatalog + SellerManagement,
{
    sellers.record_activity(&claims.sub).await?;
    let id = path.into_inner();
    api.delete_product(&claims.sub, &id).await?;
    Ok(HttpResponse::Ok().json(JsonResponse::success(format!("Product {id} deleted"))))
}

//----------------------------------------------   Seller orders  ------------------------------------------------
route!(seller_orders => Get "/seller/orders" impl OrderManagement, SellerManagement where requires [Role::Seller]);
pub async fn seller_orders<A>(
    claims: JwtClaims,
    sellers: web::Data<SellerApi<A>>,
    api: web::Data<OrderQueryApi<A>>,
) -> Result<HttpResponse, ServerError>
where
    A: OrderManagement + SellerManagement,
{
    sellers.record_activity(&claims.sub).await?;
    let orders = api.orders_for_seller(&claims.sub).await?;
    Ok(HttpResponse::Ok().json(orders))
}

route!(seller_order => Get "/seller/orders/{id}" impl OrderManagement, SellerManagement where requires [Role::Seller]);
pub async fn seller_order<A>(
    claims: JwtClaims,
    path: web::Path<String>,
    sellers: web::Data<SellerApi<A>>,
    api: web::Data<OrderQueryApi<A>>,
) -> Result<HttpResponse, ServerError>
where
    A: OrderManagement + SellerManagement,
{
    sellers.record_activity(&claims.sub).await?;
    let order = api.order_for_seller(&claims.sub, &path.into_inner()).await?;
    Ok(HttpResponse::Ok().json(order))
}

route!(update_seller_order => Put "/seller/orders/{id}" impl OrderManagement, SellerManagement where requires [Role::Seller]);
pub async fn update_seller_order<A>(
    claims: JwtClaims,
    path: web::Path<String>,
    body: web::Json<OrderStatusRequest>,
    sellers: web::Data<SellerApi<A>>,
    api: web::Data<OrderQueryApi<A>>,
) -> Result<HttpResponse, ServerError>
where
    A: OrderManagement + SellerManagement,
{
    sellers.record_activity(&claims.sub).await?;
    let OrderStatusRequest { status, tracking_number } = body.into_inner();
    let order = api.update_status_for_seller(&claims.sub, &path.into_inner(), status, tracking_number).await?;
    Ok(HttpResponse::Ok().json(order))
}
