pub mod cart_products;
pub mod carts;
pub mod customers;
pub mod orders;

pub use cart_products::Entity as CartProducts;
pub use carts::Entity as Carts;
pub use customers::Entity as Customers;
pub use orders::Entity as Orders;
