//! Generic executor sink
//!
//! Adapts any SQL-executing abstraction to [`StatementSink`]. Executors have
//! no transaction control here, so `begin`, `end` and `rollback` do nothing.

use super::{DatabaseError, DatabaseResult, StatementSink};

/// Something that can execute one SQL statement
pub trait StatementExecutor {
    fn execute(&mut self, statement: &str) -> anyhow::Result<()>;
}

/// Records statements in order
impl StatementExecutor for Vec<String> {
    fn execute(&mut self, statement: &str) -> anyhow::Result<()> {
        self.push(statement.to_string());
        Ok(())
    }
}

impl<E: StatementExecutor + ?Sized> StatementExecutor for Box<E> {
    fn execute(&mut self, statement: &str) -> anyhow::Result<()> {
        (**self).execute(statement)
    }
}

/// Sink over a [`StatementExecutor`]
#[derive(Debug)]
pub struct ExecutorSink<E> {
    executor: E,
}

impl<E: StatementExecutor> ExecutorSink<E> {
    pub fn new(executor: E) -> Self {
        Self { executor }
    }

    pub fn executor(&self) -> &E {
        &self.executor
    }

    pub fn into_inner(self) -> E {
        self.executor
    }
}

impl ExecutorSink<Vec<String>> {
    /// A sink that only records statements
    pub fn recording() -> Self {
        Self::new(Vec::new())
    }

    /// Statements recorded so far, in execution order
    pub fn into_statements(self) -> Vec<String> {
        self.executor
    }
}

impl<E: StatementExecutor> StatementSink for ExecutorSink<E> {
    fn begin(&mut self) -> DatabaseResult<()> {
        Ok(())
    }

    fn run(&mut self, statement: &str) -> DatabaseResult<()> {
        self.executor
            .execute(statement)
            .map_err(|e| DatabaseError::statement_failed(statement, e))
    }

    fn end(&mut self) -> DatabaseResult<()> {
        Ok(())
    }

    fn name(&self) -> &'static str {
        "executor"
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    struct Rejecting;

    impl StatementExecutor for Rejecting {
        fn execute(&mut self, statement: &str) -> anyhow::Result<()> {
            anyhow::bail!("rejected {}", statement.len())
        }
    }

    #[test]
    fn test_recording() {
        let mut sink = ExecutorSink::recording();
        sink.begin().unwrap();
        sink.run("A;").unwrap();
        sink.run("B;").unwrap();
        sink.end().unwrap();
        assert_eq!(sink.into_statements(), vec!["A;", "B;"]);
    }

    #[test]
    fn test_failure_carries_statement() {
        let mut sink = ExecutorSink::new(Rejecting);
        let err = sink.run("DROP TABLE x;").unwrap_err();
        assert_eq!(err.statement(), Some("DROP TABLE x;"));
        assert!(err.to_string().contains("rejected 13"));
    }
}
