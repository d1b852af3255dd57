pub mod clipboard;
pub mod scripted;

#[cfg(feature = "ssr")]
pub mod graphql;

#[cfg(feature = "ssr")]
pub mod share;
