use crate::errors::StoreError;
use aws_sdk_dynamodb::types::AttributeValue;
use domain::{Todo, TodoChanges, TodoId};
use std::collections::HashMap;
use tracing::warn;

/// DynamoDB アイテムの属性名
pub mod attributes {
    pub const ID: &str = "id";
    pub const TITLE: &str = "title";
    pub const DESCRIPTION: &str = "description";
    pub const COMPLETED: &str = "completed";
    pub const CREATED_AT: &str = "created_at";
    pub const UPDATED_AT: &str = "updated_at";
}

pub type Item = HashMap<String, AttributeValue>;

/// ToDoをDynamoDBアイテムに変換
pub fn todo_to_item(todo: &Todo) -> Item {
    let mut item = HashMap::new();
    item.insert(
        attributes::ID.to_string(),
        AttributeValue::S(todo.id.as_str().to_string()),
    );
    item.insert(
        attributes::TITLE.to_string(),
        AttributeValue::S(todo.title.clone()),
    );
    item.insert(
        attributes::DESCRIPTION.to_string(),
        AttributeValue::S(todo.description.clone()),
    );
    item.insert(
        attributes::COMPLETED.to_string(),
        AttributeValue::Bool(todo.completed),
    );
    item.insert(
        attributes::CREATED_AT.to_string(),
        AttributeValue::S(todo.created_at.clone()),
    );
    item.insert(
        attributes::UPDATED_AT.to_string(),
        AttributeValue::S(todo.updated_at.clone()),
    );
    item
}

/// DynamoDBアイテムをToDoに変換
///
/// `id` と `title` は必須。それ以外の属性が欠けている場合は既定値で補う。
pub fn item_to_todo(item: &Item) -> Result<Todo, StoreError> {
    let id = required_string(item, attributes::ID)?;
    let title = required_string(item, attributes::TITLE)?;

    let completed = match item.get(attributes::COMPLETED) {
        None => false,
        Some(value) => *value.as_bool().map_err(|_| {
            StoreError::MalformedItem(format!("{} is not a boolean (id={id})", attributes::COMPLETED))
        })?,
    };

    Ok(Todo {
        description: optional_string(item, attributes::DESCRIPTION, &id)?,
        completed,
        created_at: optional_string(item, attributes::CREATED_AT, &id)?,
        updated_at: optional_string(item, attributes::UPDATED_AT, &id)?,
        id: TodoId::from_string(id),
        title,
    })
}

/// スキャン結果のアイテムをまとめて変換する。変換できないアイテムは警告を出して除外
pub fn items_to_todos(items: &[Item]) -> Vec<Todo> {
    items
        .iter()
        .filter_map(|item| match item_to_todo(item) {
            Ok(todo) => Some(todo),
            Err(e) => {
                warn!("変換できないアイテムをスキップ: {}", e);
                None
            }
        })
        .collect()
}

fn required_string(item: &Item, name: &str) -> Result<String, StoreError> {
    item.get(name)
        .and_then(|v| v.as_s().ok())
        .cloned()
        .ok_or_else(|| StoreError::MalformedItem(format!("missing string attribute {name}")))
}

fn optional_string(item: &Item, name: &str, id: &str) -> Result<String, StoreError> {
    match item.get(name) {
        None => Ok(String::new()),
        Some(value) => value
            .as_s()
            .cloned()
            .map_err(|_| StoreError::MalformedItem(format!("{name} is not a string (id={id})"))),
    }
}

/// UpdateItem に渡す更新式
#[derive(Debug, Clone, PartialEq)]
pub struct UpdatePlan {
    pub update_expression: String,
    pub condition_expression: String,
    pub names: HashMap<String, String>,
    pub values: HashMap<String, AttributeValue>,
}

impl UpdatePlan {
    /// 指定されたフィールドのみを SET する更新式を組み立てる
    ///
    /// レコードが存在しない場合に新規作成されないよう `attribute_exists` を条件に付ける。
    pub fn from_changes(changes: &TodoChanges) -> Self {
        let mut plan = Self {
            update_expression: String::new(),
            condition_expression: format!("attribute_exists(#{})", attributes::ID),
            names: HashMap::new(),
            values: HashMap::new(),
        };
        plan.names
            .insert(format!("#{}", attributes::ID), attributes::ID.to_string());

        let mut assignments = Vec::new();
        plan.set(
            &mut assignments,
            attributes::UPDATED_AT,
            AttributeValue::S(changes.updated_at.clone()),
        );
        if let Some(title) = &changes.title {
            plan.set(&mut assignments, attributes::TITLE, AttributeValue::S(title.clone()));
        }
        if let Some(description) = &changes.description {
            plan.set(
                &mut assignments,
                attributes::DESCRIPTION,
                AttributeValue::S(description.clone()),
            );
        }
        if let Some(completed) = changes.completed {
            plan.set(&mut assignments, attributes::COMPLETED, AttributeValue::Bool(completed));
        }

        plan.update_expression = format!("SET {}", assignments.join(", "));
        plan
    }

    fn set(&mut self, assignments: &mut Vec<String>, name: &str, value: AttributeValue) {
        assignments.push(format!("#{name} = :{name}"));
        self.names.insert(format!("#{name}"), name.to_string());
        self.values.insert(format!(":{name}"), value);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::{TimeZone, Utc};
    use domain::NewTodo;

    fn sample_todo() -> Todo {
        let now = Utc.with_ymd_and_hms(2024, 3, 1, 12, 0, 0).unwrap();
        Todo::create(NewTodo::new("Buy milk", "2 liters").unwrap(), now)
    }

    #[test]
    fn test_todo_item_conversion_preserves_fields() {
        let todo = sample_todo();

        let item = todo_to_item(&todo);
        let restored = item_to_todo(&item).unwrap();

        assert_eq!(restored, todo);
        assert_eq!(item.get("completed"), Some(&AttributeValue::Bool(false)));
    }

    #[test]
    fn test_item_to_todo_fills_missing_optional_attributes() {
        // Arrange: id と title だけのアイテム
        let mut item = HashMap::new();
        item.insert("id".to_string(), AttributeValue::S("abc".to_string()));
        item.insert("title".to_string(), AttributeValue::S("Legacy".to_string()));

        // Act
        let todo = item_to_todo(&item).unwrap();

        // Assert
        assert_eq!(todo.id.as_str(), "abc");
        assert_eq!(todo.description, "");
        assert!(!todo.completed);
        assert_eq!(todo.created_at, "");
        assert_eq!(todo.updated_at, "");
    }

    #[test]
    fn test_item_to_todo_rejects_missing_title() {
        let mut item = HashMap::new();
        item.insert("id".to_string(), AttributeValue::S("abc".to_string()));

        let result = item_to_todo(&item);

        assert!(matches!(result, Err(StoreError::MalformedItem(_))));
    }

    #[test]
    fn test_item_to_todo_rejects_wrong_completed_type() {
        let mut item = todo_to_item(&sample_todo());
        item.insert("completed".to_string(), AttributeValue::S("yes".to_string()));

        let result = item_to_todo(&item);

        assert!(matches!(result, Err(StoreError::MalformedItem(_))));
    }

    #[test]
    fn test_items_to_todos_skips_malformed_items() {
        // Arrange: 正常なアイテムと変換できないアイテムの混在
        let valid = todo_to_item(&sample_todo());

        let mut missing_title = HashMap::new();
        missing_title.insert("id".to_string(), AttributeValue::S("no-title".to_string()));

        let mut numeric_title = todo_to_item(&sample_todo());
        numeric_title.insert("title".to_string(), AttributeValue::N("42".to_string()));

        let mut wrong_description = todo_to_item(&sample_todo());
        wrong_description.insert("description".to_string(), AttributeValue::Bool(true));

        let mut numeric_id = todo_to_item(&sample_todo());
        numeric_id.insert("id".to_string(), AttributeValue::N("7".to_string()));

        let mut legacy = HashMap::new();
        legacy.insert("id".to_string(), AttributeValue::S("legacy".to_string()));
        legacy.insert("title".to_string(), AttributeValue::S("Legacy".to_string()));

        let items = vec![
            missing_title,
            valid.clone(),
            numeric_title,
            wrong_description,
            legacy,
            numeric_id,
        ];

        // Act
        let todos = items_to_todos(&items);

        // Assert: 正常なアイテムだけが元の順序で残る
        let ids: Vec<&str> = todos.iter().map(|t| t.id.as_str()).collect();
        assert_eq!(ids, vec![valid["id"].as_s().unwrap().as_str(), "legacy"]);
    }

    #[test]
    fn test_items_to_todos_empty_page() {
        assert!(items_to_todos(&[]).is_empty());
    }

    #[test]
    fn test_update_plan_with_only_timestamp() {
        let changes = TodoChanges::new(Utc.with_ymd_and_hms(2024, 3, 2, 0, 0, 0).unwrap());

        let plan = UpdatePlan::from_changes(&changes);

        assert_eq!(plan.update_expression, "SET #updated_at = :updated_at");
        assert_eq!(plan.condition_expression, "attribute_exists(#id)");
        assert_eq!(plan.values.len(), 1);
        assert_eq!(
            plan.values.get(":updated_at"),
            Some(&AttributeValue::S("2024-03-02T00:00:00.000000Z".to_string()))
        );
        assert_eq!(plan.names.get("#id"), Some(&"id".to_string()));
    }

    #[test]
    fn test_update_plan_sets_supplied_fields() {
        let changes = TodoChanges::new(Utc.with_ymd_and_hms(2024, 3, 2, 0, 0, 0).unwrap())
            .title("New title")
            .unwrap()
            .description("")
            .completed(true);

        let plan = UpdatePlan::from_changes(&changes);

        assert_eq!(
            plan.update_expression,
            "SET #updated_at = :updated_at, #title = :title, #description = :description, #completed = :completed"
        );
        assert_eq!(
            plan.values.get(":title"),
            Some(&AttributeValue::S("New title".to_string()))
        );
        assert_eq!(
            plan.values.get(":description"),
            Some(&AttributeValue::S(String::new()))
        );
        assert_eq!(plan.values.get(":completed"), Some(&AttributeValue::Bool(true)));
        assert_eq!(plan.names.len(), 5);
    }
}
