use log::{debug, info};

use crate::hw::inst::Instruction;
use crate::hw::ram::Ram;
use crate::hw::HwError;

use super::program::Program;
use super::KernelError;

/// One page of a process's logical address space. Ids are ordinals within
/// the owning page table.
#[derive(Debug, Clone, PartialEq)]
pub struct Page {
    id: usize,
    cells: Vec<Instruction>,
}

impl Page {
    pub fn new(id: usize, cells: Vec<Instruction>) -> Page {
        Page { id, cells }
    }

    pub fn id(&self) -> usize {
        self.id
    }

    pub fn cells(&self) -> &[Instruction] {
        &self.cells
    }
}

/// Per-process (page, frame) pairs, built at NEW handling and immutable
/// afterwards.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PageTable {
    entries: Vec<(usize, usize)>,
}

impl PageTable {
    pub fn new() -> PageTable {
        PageTable {
            entries: Vec::new(),
        }
    }

    pub fn add(&mut self, page: usize, frame: usize) {
        self.entries.push((page, frame));
    }

    pub fn entries(&self) -> &[(usize, usize)] {
        &self.entries
    }

    pub fn first_frame(&self) -> Option<usize> {
        self.entries.first().map(|&(_, frame)| frame)
    }
}

/// Every page created so far, across all processes. Pages are added when
/// the memory manager creates them and kept for the life of the kernel.
pub struct LogicalMemory {
    pages: Vec<Page>,
}

impl LogicalMemory {
    pub fn new() -> LogicalMemory {
        LogicalMemory { pages: Vec::new() }
    }

    pub fn add_page(&mut self, page: Page) {
        self.pages.push(page);
    }

    /// The most recently created page with the given id. Ids repeat across
    /// processes, so this is only meaningful while that process is being
    /// built.
    pub fn page_for_id(&self, id: usize) -> Option<&Page> {
        self.pages.iter().rev().find(|page| page.id() == id)
    }

    pub fn page_count(&self) -> usize {
        self.pages.len()
    }
}

/// Paging memory manager: splits programs into pages, owns the frame
/// pool, reclaims frames on termination.
pub struct MemoryManager {
    frame_size: usize,
    free_frames: Vec<usize>,
    used_frames: Vec<usize>,
    logical_memory: LogicalMemory,
}

impl MemoryManager {
    pub fn new(frame_size: usize, frame_count: usize) -> MemoryManager {
        MemoryManager {
            frame_size,
            free_frames: (0..frame_count).collect(),
            used_frames: Vec::new(),
            logical_memory: LogicalMemory::new(),
        }
    }

    pub fn frame_size(&self) -> usize {
        self.frame_size
    }

    pub fn free_frame_count(&self) -> usize {
        self.free_frames.len()
    }

    pub fn used_frame_count(&self) -> usize {
        self.used_frames.len()
    }

    /// Free memory in cells.
    pub fn free_cells(&self) -> usize {
        self.free_frames.len() * self.frame_size
    }

    pub fn base_dir_of_frame(&self, frame: usize) -> usize {
        frame * self.frame_size
    }

    pub fn logical_memory(&self) -> &LogicalMemory {
        &self.logical_memory
    }

    /// Splits a program into frame-sized pages and allocates one free
    /// frame per page. All-or-nothing: when the free pool cannot hold the
    /// whole program, nothing is taken.
    pub fn page_table_for(&mut self, program: &Program) -> Result<PageTable, KernelError> {
        let chunks: Vec<&[Instruction]> = program.instructions().chunks(self.frame_size).collect();
        if chunks.len() > self.free_frames.len() {
            return Err(KernelError::OutOfMemory {
                required: chunks.len(),
                available: self.free_frames.len(),
            });
        }
        let mut table = PageTable::new();
        for (id, cells) in chunks.into_iter().enumerate() {
            let frame = self.take_free_frame();
            self.logical_memory.add_page(Page::new(id, cells.to_vec()));
            table.add(id, frame);
        }
        debug!(
            "allocated {} frame(s), {} free",
            table.entries().len(),
            self.free_frames.len()
        );
        Ok(table)
    }

    fn take_free_frame(&mut self) -> usize {
        let frame = self.free_frames.remove(0);
        self.used_frames.push(frame);
        frame
    }

    /// Returns every frame of a terminated process's page table to the
    /// free pool.
    pub fn release(&mut self, page_table: &PageTable) -> Result<(), KernelError> {
        for &(_, frame) in page_table.entries() {
            match self.used_frames.iter().position(|&used| used == frame) {
                Some(index) => {
                    self.used_frames.remove(index);
                    self.free_frames.push(frame);
                }
                None => return Err(KernelError::FrameNotAllocated(frame)),
            }
        }
        info!("free frames after release: {:?}", self.free_frames);
        Ok(())
    }
}

/// Writes pages into the frames their page table assigned them.
pub struct Loader {
    frame_size: usize,
}

impl Loader {
    pub fn new(frame_size: usize) -> Loader {
        Loader { frame_size }
    }

    pub fn load(&self, page: &Page, frame: usize, ram: &mut Ram) -> Result<(), HwError> {
        let base_dir = frame * self.frame_size;
        for (offset, &inst) in page.cells().iter().enumerate() {
            ram.write(base_dir + offset, inst)?;
        }
        Ok(())
    }
}
