use std::collections::HashMap;

use super::program::Program;
use super::KernelError;

/// Path-to-program store. Just enough file system for the NEW handler to
/// fetch submitted programs by path.
pub struct FileSystem {
    files: HashMap<String, Program>,
}

impl FileSystem {
    pub fn new() -> FileSystem {
        FileSystem {
            files: HashMap::new(),
        }
    }

    pub fn write(&mut self, path: &str, program: Program) {
        self.files.insert(path.to_string(), program);
    }

    pub fn read(&self, path: &str) -> Result<&Program, KernelError> {
        self.files
            .get(path)
            .ok_or_else(|| KernelError::ProgramNotFound(path.to_string()))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::os::program::Section;

    #[test]
    fn read_back_written_program() {
        let mut fs = FileSystem::new();
        let program = Program::new("prg.exe", &[Section::Cpu(2)]);
        fs.write("c:/prg.exe", program.clone());
        assert_eq!(&program, fs.read("c:/prg.exe").unwrap());
    }

    #[test]
    fn missing_path_is_an_error() {
        let fs = FileSystem::new();
        assert_eq!(
            Err(KernelError::ProgramNotFound("c:/nope.exe".to_string())),
            fs.read("c:/nope.exe").map(|_| ())
        );
    }
}
