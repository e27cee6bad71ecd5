use crate::model::task::{Task, TaskStatus};

/// Kanban columns. Each column keeps store order.
#[derive(Debug, Default)]
pub struct Board<'a> {
    pub todo: Vec<&'a Task>,
    pub in_progress: Vec<&'a Task>,
    pub done: Vec<&'a Task>,
}

impl<'a> Board<'a> {
    pub fn column(&self, status: TaskStatus) -> &[&'a Task] {
        match status {
            TaskStatus::Todo => &self.todo,
            TaskStatus::InProgress => &self.in_progress,
            TaskStatus::Done => &self.done,
        }
    }

    /// Columns in display order, paired with their status
    pub fn columns(&self) -> impl Iterator<Item = (TaskStatus, &[&'a Task])> + '_ {
        TaskStatus::ALL.into_iter().map(move |s| (s, self.column(s)))
    }

    pub fn len(&self) -> usize {
        self.todo.len() + self.in_progress.len() + self.done.len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

/// Group every task by status into the fixed board columns
pub fn board(tasks: &[Task]) -> Board<'_> {
    let mut board = Board::default();
    for task in tasks {
        match task.status {
            TaskStatus::Todo => board.todo.push(task),
            TaskStatus::InProgress => board.in_progress.push(task),
            TaskStatus::Done => board.done.push(task),
        }
    }
    board
}
