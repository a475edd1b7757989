use anyhow::Result;
use bosun_core::Task;
use bosun_storage::TaskRepository;
use chrono::Utc;

pub fn add_task(repo: &impl TaskRepository, text: &str) -> Result<String> {
    let text = text.trim();
    if text.is_empty() {
        return Ok("Tell me what the task is, like: add task buy milk.".to_string());
    }

    let mut tasks = repo.load_tasks()?;
    tasks.push(Task {
        id: Utc::now().timestamp_millis(),
        text: text.to_string(),
        done: false,
    });
    repo.save_tasks(&tasks)?;

    Ok(format!("Added task: {text}"))
}

pub fn list_tasks(repo: &impl TaskRepository) -> Result<String> {
    let tasks = repo.load_tasks()?;
    let pending: Vec<&Task> = tasks.iter().filter(|task| !task.done).collect();

    if pending.is_empty() {
        return Ok("You have no outstanding tasks.".to_string());
    }

    let mut lines = vec![format!("You have {} tasks remaining:", pending.len())];
    for task in pending {
        lines.push(format!("ID {}: {}", short_id(task.id), task.text));
    }
    Ok(lines.join(". "))
}

/// Mark done by id suffix, so "mark task 4821 done" works against the last
/// four digits read out by `list_tasks`. The first match in creation order
/// wins. Tasks are never deleted.
pub fn complete_task(repo: &impl TaskRepository, id_part: &str) -> Result<String> {
    let id_part = id_part.trim();
    if id_part.is_empty() || !id_part.chars().all(|c| c.is_ascii_digit()) {
        return Ok("Couldn't find the task ID. Say: mark task 1234 done.".to_string());
    }

    let mut tasks = repo.load_tasks()?;
    let hit = tasks
        .iter_mut()
        .find(|task| task.id.to_string().ends_with(id_part));

    match hit {
        Some(task) => {
            task.done = true;
            repo.save_tasks(&tasks)?;
            Ok(format!("Marked task ending in {id_part} as done."))
        }
        None => Ok(format!("No task with an ID ending in {id_part}.")),
    }
}

fn short_id(id: i64) -> String {
    let digits = id.to_string();
    if digits.len() <= 4 {
        digits
    } else {
        digits[digits.len() - 4..].to_string()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use bosun_storage::MemoryStore;

    #[test]
    fn add_and_list() {
        let store = MemoryStore::new();
        add_task(&store, "buy milk").unwrap();

        let listing = list_tasks(&store).unwrap();
        assert!(listing.contains("1 tasks remaining"));
        assert!(listing.contains("buy milk"));
    }

    #[test]
    fn complete_by_suffix_keeps_the_entry() {
        let store = MemoryStore::new();
        add_task(&store, "buy milk").unwrap();

        let id = store.load_tasks().unwrap()[0].id.to_string();
        let suffix = &id[id.len() - 4..];
        let reply = complete_task(&store, suffix).unwrap();
        assert!(reply.contains("as done"));

        // Physically still there, just flagged.
        let tasks = store.load_tasks().unwrap();
        assert_eq!(tasks.len(), 1);
        assert!(tasks[0].done);
        assert!(list_tasks(&store).unwrap().contains("no outstanding"));
    }

    #[test]
    fn unknown_suffix_reports_not_found() {
        let store = MemoryStore::new();
        add_task(&store, "buy milk").unwrap();
        assert!(complete_task(&store, "0000000").unwrap().contains("No task"));
    }

    #[test]
    fn empty_task_text_is_coached() {
        let store = MemoryStore::new();
        assert!(add_task(&store, "  ").unwrap().contains("Tell me"));
        assert!(store.load_tasks().unwrap().is_empty());
    }
}
