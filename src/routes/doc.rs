use utoipa::{
    Modify, OpenApi,
    openapi::{
        self,
        OpenApi as OpenApiSpec,
        security::{HttpAuthScheme, HttpBuilder, SecurityScheme},
    },
};
use utoipa_scalar::{Scalar, Servable};

use crate::{
    dto::{
        auth as auth_dto, cart as cart_dto, catalog as catalog_dto, orders as orders_dto,
    },
    models::{
        BuyingType, Cart, CartProduct, Category, Customer, Notebook, Order, OrderStatus,
        ProductKind, ProductSummary, Seller, Smartphone, User,
    },
    response::{ApiResponse, Meta},
    routes::{admin, auth, cart, catalog, customers, health, orders, params},
};

struct SecurityAddon;

impl Modify for SecurityAddon {
    fn modify(&self, openapi: &mut openapi::OpenApi) {
        let components = openapi.components.get_or_insert_with(Default::default);
        components.add_security_scheme(
            "bearer_auth",
            SecurityScheme::Http(
                HttpBuilder::new()
                    .scheme(HttpAuthScheme::Bearer)
                    .bearer_format("JWT")
                    .build(),
            ),
        );
    }
}

#[derive(OpenApi)]
#[openapi(
    paths(
        health::health_check,
        auth::sign_up,
        auth::sign_in,
        auth::sign_out,
        catalog::latest_products,
        catalog::list_categories,
        catalog::create_category,
        catalog::get_category,
        catalog::list_sellers,
        catalog::create_seller,
        catalog::create_notebook,
        catalog::get_notebook,
        catalog::create_smartphone,
        catalog::get_smartphone,
        catalog::upload_product_image,
        catalog::get_product_image,
        cart::view_cart,
        cart::add_to_cart,
        cart::update_item,
        cart::remove_item,
        orders::make_order,
        orders::list_orders,
        orders::get_order,
        customers::get_me,
        customers::update_me,
        admin::list_all_orders,
        admin::get_order_admin,
        admin::update_order_status,
    ),
    components(
        schemas(
            User,
            Customer,
            Category,
            Seller,
            Notebook,
            Smartphone,
            ProductSummary,
            ProductKind,
            Cart,
            CartProduct,
            Order,
            OrderStatus,
            BuyingType,
            auth_dto::SignUpRequest,
            auth_dto::SignInRequest,
            auth_dto::SignInResponse,
            auth_dto::UpdateCustomerRequest,
            cart_dto::AddToCartRequest,
            cart_dto::UpdateCartItemRequest,
            cart_dto::CartItemDto,
            cart_dto::CartDto,
            catalog_dto::CreateCategoryRequest,
            catalog_dto::CreateSellerRequest,
            catalog_dto::CreateNotebookRequest,
            catalog_dto::CreateSmartphoneRequest,
            catalog_dto::ProductList,
            catalog_dto::CategoryList,
            catalog_dto::CategoryWithProducts,
            catalog_dto::SellerList,
            orders_dto::MakeOrderRequest,
            orders_dto::OrderWithItems,
            orders_dto::OrderList,
            admin::UpdateOrderStatusRequest,
            params::Pagination,
            params::OrderListQuery,
            Meta,
            ApiResponse<Order>,
            ApiResponse<cart_dto::CartDto>,
            ApiResponse<orders_dto::OrderWithItems>,
            ApiResponse<orders_dto::OrderList>,
            ApiResponse<catalog_dto::ProductList>
        )
    ),
    security(
        ("bearer_auth" = [])
    ),
    modifiers(&SecurityAddon),
    tags(
        (name = "Health", description = "Health check endpoint"),
        (name = "Catalog", description = "Categories, sellers and products"),
        (name = "Cart", description = "Cart endpoints"),
        (name = "Orders", description = "Checkout and order history"),
        (name = "Customers", description = "Customer profile"),
        (name = "Admin", description = "Order fulfillment workflow"),
        (name = "Auth", description = "Authentication endpoints"),
    )
)]
pub struct ApiDoc;

pub fn scalar_docs() -> Scalar<OpenApiSpec> {
    Scalar::with_url("/docs", ApiDoc::openapi())
}
