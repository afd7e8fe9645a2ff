//! Access-token handling. Tokens are issued by an external identity
//! provider; see [`jwt`].

pub mod jwt;
