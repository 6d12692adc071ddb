use crate::{
    data::student::{Student, StudentCreate, StudentDraft, StudentUpdate},
    error::{MissingStudentSnafu, StudentsResult},
};
use snafu::OptionExt;
use std::sync::Arc;
use tokio::sync::Mutex;

/// The in-memory collection of students, in creation order, plus the next id to hand out.
#[derive(Debug)]
pub struct StudentStore {
    students: Vec<Student>,
    next_id: i64,
}

impl Default for StudentStore {
    fn default() -> Self {
        Self {
            students: vec![],
            next_id: 1,
        }
    }
}

impl StudentStore {
    fn position(&self, id: i64) -> StudentsResult<usize> {
        self.students
            .iter()
            .position(|student| student.id == id)
            .context(MissingStudentSnafu { id })
    }

    pub fn create(&mut self, form: StudentCreate) -> StudentsResult<Student> {
        let student = StudentDraft::from(form).into_student(self.next_id)?;
        self.next_id += 1;
        self.students.push(student.clone());

        info!(id = student.id, "Created student");
        Ok(student)
    }

    pub fn list(&self) -> Vec<Student> {
        self.students.clone()
    }

    pub fn get_by_id(&self, id: i64) -> StudentsResult<Student> {
        debug!(id, count = self.students.len(), "Searching for student");
        let student = self.students[self.position(id)?].clone();
        debug!(?student, "Found student");
        Ok(student)
    }

    ///nothing is written unless the merged student passes validation
    pub fn update(&mut self, id: i64, update: StudentUpdate) -> StudentsResult<Student> {
        let index = self.position(id)?;
        let current = &self.students[index];

        let updated = StudentDraft::from(current)
            .merge(update)
            .into_student(current.id)?;
        self.students[index] = updated.clone();

        info!(id, "Updated student");
        Ok(updated)
    }

    pub fn delete(&mut self, id: i64) -> StudentsResult<()> {
        let index = self.position(id)?;
        self.students.remove(index);

        info!(id, "Deleted student");
        Ok(())
    }

    pub fn len(&self) -> usize {
        self.students.len()
    }
}

#[derive(Clone, Debug, Default)]
pub struct StudentsState {
    store: Arc<Mutex<StudentStore>>,
}

impl StudentsState {
    pub fn new() -> Self {
        Self::default()
    }

    pub async fn create(&self, form: StudentCreate) -> StudentsResult<Student> {
        self.store.lock().await.create(form)
    }

    pub async fn list(&self) -> Vec<Student> {
        self.store.lock().await.list()
    }

    pub async fn get_by_id(&self, id: i64) -> StudentsResult<Student> {
        self.store.lock().await.get_by_id(id)
    }

    pub async fn update(&self, id: i64, update: StudentUpdate) -> StudentsResult<Student> {
        self.store.lock().await.update(id, update)
    }

    pub async fn delete(&self, id: i64) -> StudentsResult<()> {
        self.store.lock().await.delete(id)
    }

    pub async fn sensible_shutdown(&self) {
        let count = self.store.lock().await.len();
        info!(count, "Dropping in-memory students");
    }
}
