use super::inst::Instruction;
use super::HwError;

/// Physical memory: a flat vector of instruction cells.
pub struct Ram {
    cells: Vec<Option<Instruction>>,
}

impl Ram {
    pub fn new(mem_size: usize) -> Ram {
        Ram {
            cells: vec![None; mem_size],
        }
    }

    pub fn size(&self) -> usize {
        self.cells.len()
    }

    pub fn read(&self, addr: usize) -> Result<Instruction, HwError> {
        match self.cells.get(addr) {
            Some(Some(inst)) => Ok(*inst),
            Some(None) => Err(HwError::EmptyCell(addr)),
            None => Err(HwError::AddressOutOfRange(addr)),
        }
    }

    pub fn write(&mut self, addr: usize, inst: Instruction) -> Result<(), HwError> {
        match self.cells.get_mut(addr) {
            Some(cell) => {
                *cell = Some(inst);
                Ok(())
            }
            None => Err(HwError::AddressOutOfRange(addr)),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn read_back_written_cell() {
        let mut ram = Ram::new(8);
        ram.write(3, Instruction::Io).unwrap();
        assert_eq!(Ok(Instruction::Io), ram.read(3));
    }

    #[test]
    fn empty_cell_is_an_error() {
        let ram = Ram::new(8);
        assert_eq!(Err(HwError::EmptyCell(0)), ram.read(0));
    }

    #[test]
    fn out_of_range_is_an_error() {
        let mut ram = Ram::new(8);
        assert_eq!(Err(HwError::AddressOutOfRange(8)), ram.read(8));
        assert_eq!(
            Err(HwError::AddressOutOfRange(9)),
            ram.write(9, Instruction::Cpu)
        );
    }
}
