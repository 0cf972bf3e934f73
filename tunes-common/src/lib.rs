//! # Tunes Common Library
//!
//! Shared code for the Tunes platform services:
//! - Catalog entity models (songs, people, collections, genres)
//! - Database bootstrap and schema
//! - Configuration loading and root folder resolution
//! - Common error type

pub mod config;
pub mod db;
pub mod error;

pub use db::models::{
    Collection, CollectionKind, Entity, EntityKind, Genre, Person, PersonRef, Song,
};
pub use error::{Error, Result};
