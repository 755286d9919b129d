// Copyright (c) 2025 - Cowboy AI, Inc.
//! Property-Based Tests Module

mod allocation;
mod plan_order;
