// Copyright 2024 OctoFHIR Team
//
// Licensed under the Apache License, Version 2.0 (the "License");
// you may not use this file except in compliance with the License.
// You may obtain a copy of the License at
//
//     http://www.apache.org/licenses/LICENSE-2.0
//
// Unless required by applicable law or agreed to in writing, software
// distributed under the License is distributed on an "AS IS" BASIS,
// WITHOUT WARRANTIES OR CONDITIONS OF ANY KIND, either express or implied.
// See the License for the specific language governing permissions and
// limitations under the License.
//! FHIRPath engine with parsed expression caching

use crate::ast::ExpressionNode;
use crate::error::Result;
use crate::evaluator::Evaluator;
use crate::model::Collection;
use crate::parser::parse_expression;
use log::trace;
use lru::LruCache;
use parking_lot::Mutex;
use serde::{Deserialize, Serialize};
use serde_json::Value;
use std::fmt;
use std::num::NonZeroUsize;
use std::sync::Arc;

/// Default number of parsed expressions kept by an engine
pub const DEFAULT_EXPRESSION_CACHE_SIZE: usize = 1000;

/// Configuration for [`FhirPathEngine`]
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct EngineConfig {
    /// Maximum number of parsed expressions to keep; `0` disables the cache
    pub expression_cache_size: usize,
}

impl Default for EngineConfig {
    fn default() -> Self {
        Self {
            expression_cache_size: DEFAULT_EXPRESSION_CACHE_SIZE,
        }
    }
}

/// Evaluates FHIRPath expressions against JSON documents
///
/// The engine is cheap to share behind an [`Arc`]; parsed expressions are
/// cached so templates that repeat the same expression only parse it once.
pub struct FhirPathEngine {
    evaluator: Evaluator,
    expression_cache: Option<Mutex<LruCache<String, Arc<ExpressionNode>>>>,
    config: EngineConfig,
}

impl FhirPathEngine {
    /// Create an engine with the default configuration
    pub fn new() -> Self {
        Self::with_config(EngineConfig::default())
    }

    /// Create an engine with a custom configuration
    pub fn with_config(config: EngineConfig) -> Self {
        let expression_cache = NonZeroUsize::new(config.expression_cache_size)
            .map(|capacity| Mutex::new(LruCache::new(capacity)));
        Self {
            evaluator: Evaluator::new(),
            expression_cache,
            config,
        }
    }

    /// Get the engine configuration
    pub fn config(&self) -> &EngineConfig {
        &self.config
    }

    /// Parse an expression, reusing a cached AST when one exists
    pub fn parse(&self, expression: &str) -> Result<Arc<ExpressionNode>> {
        if let Some(cache) = &self.expression_cache {
            if let Some(ast) = cache.lock().get(expression) {
                return Ok(Arc::clone(ast));
            }
        }

        let ast = Arc::new(parse_expression(expression)?);
        trace!("Parsed expression `{expression}`");

        if let Some(cache) = &self.expression_cache {
            cache.lock().put(expression.to_string(), Arc::clone(&ast));
        }
        Ok(ast)
    }

    /// Evaluate `expression` with `context` as the initial focus
    ///
    /// A JSON array context is treated as a collection of items, `null` as the
    /// empty collection and anything else as a single item.
    pub fn evaluate(&self, context: &Value, expression: &str) -> Result<Collection> {
        let ast = self.parse(expression)?;
        let result = self
            .evaluator
            .evaluate(&ast, context)
            .map_err(|err| err.with_expression(expression))?;
        trace!("`{expression}` produced {} item(s)", result.len());
        Ok(result)
    }

    /// Number of parsed expressions currently cached
    pub fn cached_expressions(&self) -> usize {
        self.expression_cache
            .as_ref()
            .map_or(0, |cache| cache.lock().len())
    }

    /// Drop every cached expression
    pub fn clear_cache(&self) {
        if let Some(cache) = &self.expression_cache {
            cache.lock().clear();
        }
    }
}

impl Default for FhirPathEngine {
    fn default() -> Self {
        Self::new()
    }
}

impl fmt::Debug for FhirPathEngine {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("FhirPathEngine")
            .field("config", &self.config)
            .field("cached_expressions", &self.cached_expressions())
            .finish()
    }
}
