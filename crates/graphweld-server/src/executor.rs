//! Executor seam
//!
//! The HTTP adapter never holds a concrete schema type; it executes through
//! [`GraphQLExecutor`] so the route layer stays independent of the
//! application's root types.

use async_graphql::{BatchRequest, BatchResponse, ObjectType, Schema, SubscriptionType};
use async_trait::async_trait;

/// Executes a transport-level request, single or batched.
#[async_trait]
pub trait GraphQLExecutor: Send + Sync {
    async fn execute(&self, batch: BatchRequest) -> BatchResponse;
}

#[async_trait]
impl<Q, M, S> GraphQLExecutor for Schema<Q, M, S>
where
    Q: ObjectType + 'static,
    M: ObjectType + 'static,
    S: SubscriptionType + 'static,
{
    async fn execute(&self, batch: BatchRequest) -> BatchResponse {
        self.execute_batch(batch).await
    }
}
