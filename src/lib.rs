// (C) Copyright 2019-2020 Hewlett Packard Enterprise Development LP

#![forbid(unsafe_code)]

//! # srclib toolchain for Dockerfiles
//!
//! Discovers Dockerfiles in a source tree and produces the JSON documents a
//! code-indexing host consumes: one source unit per Dockerfile (`scan`), a
//! resolution per base image dependency (`depresolve`), and a definition plus
//! hyperlink annotations for each Dockerfile (`graph`).
//!
//! ## Quick start
//!
//! ```rust
//! use srclib_dockerfile::{Dockerfile, ImageRef};
//!
//! let dockerfile = Dockerfile::parse(r#"
//!   FROM alpine:3.18
//!   RUN echo "hello world" > /hello-world
//! "#).unwrap();
//!
//! let image = ImageRef::resolve(dockerfile.from()).unwrap();
//! assert_eq!(image.name, "library/alpine");
//! assert_eq!(image.tag, "3.18");
//! ```

#[macro_use] extern crate pest_derive;

mod error;
mod parser;
mod util;
mod span;
mod image;
mod instructions;
mod dockerfile_parser;

pub mod unit;
pub mod protocol;
pub mod scan;
pub mod depresolve;
pub mod graph;

pub use image::*;
pub use error::*;
pub use parser::Rule;
pub use instructions::*;
pub use span::*;
pub use crate::dockerfile_parser::*;

#[cfg(test)] mod test_util;
