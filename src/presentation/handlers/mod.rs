// Copyright (c) 2025 Kirky.X
//
// Licensed under the MIT License
// See LICENSE file in the project root for full license information.

pub mod chapter_handler;
pub mod favorites_handler;
pub mod search_handler;
pub mod source_handler;
