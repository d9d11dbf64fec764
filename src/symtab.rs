// Symbol table layering: a global `Word` table plus an ordered sequence of
// per-function `Process` tables. Lookup searches the current process's
// locals first, then falls through to globals; index 0 is a sentinel in
// both tables, so a zero result means "not found."

use crate::attributes::Word;

#[derive(Debug, Clone, Default)]
pub struct Process {
    pub name: String,
    pub return_type: String,
    pub start_address: u32,
    pub params: Vec<Word>,
    pub locals: Vec<Word>,
    pub temporaries: Vec<Word>,
    pub actual_returns: Vec<String>,
}

impl Process {
    pub fn new() -> Self {
        Self {
            locals: vec![sentinel()],
            ..Default::default()
        }
    }

    pub fn fresh_temp(&mut self) -> String {
        let name = format!("__T{}", self.temporaries.len());
        let id = self.temporaries.len() as u32;
        self.temporaries.push(Word {
            id,
            name: name.clone(),
            ty: "i32".to_string(),
        });
        name
    }
}

fn sentinel() -> Word {
    Word {
        id: 0,
        name: String::new(),
        ty: String::new(),
    }
}

#[derive(Debug, Clone, Default)]
pub struct SymbolTables {
    pub globals: Vec<Word>,
    pub processes: Vec<Process>,
}

impl SymbolTables {
    pub fn new() -> Self {
        Self {
            globals: vec![sentinel()],
            processes: Vec::new(),
        }
    }

    pub fn push_process(&mut self, start_address: u32) {
        self.processes.push(Process {
            start_address,
            ..Process::new()
        });
    }

    pub fn current(&self) -> &Process {
        self.processes.last().expect("no current process")
    }

    pub fn current_mut(&mut self) -> &mut Process {
        self.processes.last_mut().expect("no current process")
    }

    /// Searches the current process's locals, then globals. A positive
    /// result is a local index, a negative result is `-global_index`, and 0
    /// means "not found" (the sentinel-slot convention both tables share).
    pub fn lookup(&self, name: &str) -> i64 {
        if let Some(process) = self.processes.last() {
            for (i, word) in process.locals.iter().enumerate() {
                if word.name == name {
                    return i as i64;
                }
            }
        }
        for (i, word) in self.globals.iter().enumerate() {
            if word.name == name {
                return -(i as i64);
            }
        }
        0
    }

    /// Creates a new local `Word` in the current process and returns it.
    pub fn create_local(&mut self, name: &str, ty: &str) -> Word {
        let process = self.current_mut();
        let id = process.locals.len() as u32;
        let word = Word {
            id,
            name: name.to_string(),
            ty: ty.to_string(),
        };
        process.locals.push(word.clone());
        word
    }

    pub fn function_by_name(&self, name: &str) -> Option<&Process> {
        self.processes.iter().find(|p| p.name == name)
    }

    /// Duplicate-function check, excluding the process currently being
    /// declared (always the last one pushed).
    pub fn has_other_function_named(&self, name: &str) -> bool {
        let len = self.processes.len();
        self.processes[..len.saturating_sub(1)]
            .iter()
            .any(|p| p.name == name)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn lookup_returns_zero_for_sentinel_and_unknown_names() {
        let tables = SymbolTables::new();
        assert_eq!(tables.lookup(""), 0);
        assert_eq!(tables.lookup("nope"), 0);
    }

    #[test]
    fn create_local_is_found_by_lookup() {
        let mut tables = SymbolTables::new();
        tables.push_process(100);
        tables.create_local("x", "i32");
        assert_eq!(tables.lookup("x"), 1);
    }

    #[test]
    fn fresh_temp_names_are_sequential_per_process() {
        let mut tables = SymbolTables::new();
        tables.push_process(100);
        assert_eq!(tables.current_mut().fresh_temp(), "__T0");
        assert_eq!(tables.current_mut().fresh_temp(), "__T1");
        tables.push_process(200);
        assert_eq!(tables.current_mut().fresh_temp(), "__T0");
    }

    #[test]
    fn duplicate_function_check_excludes_the_current_process() {
        let mut tables = SymbolTables::new();
        tables.push_process(100);
        tables.current_mut().name = "main".to_string();
        assert!(!tables.has_other_function_named("main"));
        tables.push_process(200);
        tables.current_mut().name = "main".to_string();
        assert!(tables.has_other_function_named("main"));
    }
}
