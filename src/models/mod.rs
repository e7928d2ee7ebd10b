pub mod guild;
pub mod lang;
