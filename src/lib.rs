// Copyright 2026, Jeroen van Erp <jeroen@geeko.me>
// SPDX-License-Identifier: Apache-2.0
pub mod cluster;
pub mod config;
pub mod console;
pub mod constants;
pub mod endpoint;
pub mod error;
pub mod kubeconfig;
pub mod kubernetes;
pub mod package;
pub mod pipeline;
pub mod reporting;

#[cfg(test)]
pub mod test_utils;
