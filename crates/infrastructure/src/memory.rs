use crate::errors::StoreError;
use crate::repositories::TodoStore;
use async_trait::async_trait;
use domain::{Todo, TodoChanges, TodoId};
use std::collections::HashMap;
use std::sync::Arc;
use tokio::sync::RwLock;

/// プロセス内メモリに保持するストア
#[derive(Clone, Default)]
pub struct InMemoryTodoStore {
    todos: Arc<RwLock<HashMap<TodoId, Todo>>>,
}

impl InMemoryTodoStore {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_todos(todos: impl IntoIterator<Item = Todo>) -> Self {
        let todos = todos
            .into_iter()
            .map(|todo| (todo.id.clone(), todo))
            .collect();
        Self {
            todos: Arc::new(RwLock::new(todos)),
        }
    }

    pub async fn len(&self) -> usize {
        self.todos.read().await.len()
    }

    pub async fn is_empty(&self) -> bool {
        self.todos.read().await.is_empty()
    }
}

#[async_trait]
impl TodoStore for InMemoryTodoStore {
    async fn scan_all(&self) -> Result<Vec<Todo>, StoreError> {
        Ok(self.todos.read().await.values().cloned().collect())
    }

    async fn get(&self, id: &TodoId) -> Result<Option<Todo>, StoreError> {
        Ok(self.todos.read().await.get(id).cloned())
    }

    async fn put(&self, todo: &Todo) -> Result<(), StoreError> {
        self.todos
            .write()
            .await
            .insert(todo.id.clone(), todo.clone());
        Ok(())
    }

    async fn partial_update(
        &self,
        id: &TodoId,
        changes: &TodoChanges,
    ) -> Result<Option<Todo>, StoreError> {
        let mut todos = self.todos.write().await;
        Ok(todos.get_mut(id).map(|todo| {
            todo.apply(changes);
            todo.clone()
        }))
    }

    async fn delete(&self, id: &TodoId) -> Result<(), StoreError> {
        self.todos.write().await.remove(id);
        Ok(())
    }
}
