pub mod authorizer;
pub mod credential;
pub mod factory;
pub mod key_material;
pub mod policy;

pub use authorizer::{
    Authorizer, AuthorizerError, AuthorizerMode, AuthorizerRequest, Decision, Principal,
};
pub use factory::build_authorizer;
