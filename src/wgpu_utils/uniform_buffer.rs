// src/wgpu_utils/uniform_buffer.rs
use std::marker::PhantomData;

/// Rounds `size` up to a multiple of `alignment` (a power of two)
pub fn aligned_stride(size: u64, alignment: u64) -> u64 {
    let alignment = alignment.max(1);
    size.div_ceil(alignment) * alignment
}

/// One uniform buffer holding many `Content` blocks, addressed by dynamic offset
///
/// Blocks are staged on the CPU with [`push`](Self::push) during a frame and
/// written in one go by [`upload`](Self::upload). The GPU buffer grows when a
/// frame needs more blocks than it has room for.
pub struct DynamicUniformBuffer<Content> {
    buffer: wgpu::Buffer,
    content_type: PhantomData<Content>,
    stride: u64,
    capacity: usize,
    staged: Vec<u8>,
}

impl<Content: bytemuck::Pod> DynamicUniformBuffer<Content> {
    fn name() -> &'static str {
        let type_name = std::any::type_name::<Content>();
        let pos = type_name.rfind(':').unwrap_or(0);
        if pos > 0 {
            &type_name[(pos + 1)..]
        } else {
            type_name
        }
    }

    fn create_buffer(device: &wgpu::Device, stride: u64, capacity: usize) -> wgpu::Buffer {
        device.create_buffer(&wgpu::BufferDescriptor {
            label: Some(&format!("DynamicUniformBuffer: {}", Self::name())),
            size: stride * capacity as u64,
            usage: wgpu::BufferUsages::UNIFORM | wgpu::BufferUsages::COPY_DST,
            mapped_at_creation: false,
        })
    }

    /// Create a buffer with room for `capacity` blocks
    pub fn new(device: &wgpu::Device, capacity: usize) -> Self {
        let alignment = device.limits().min_uniform_buffer_offset_alignment as u64;
        let stride = aligned_stride(std::mem::size_of::<Content>() as u64, alignment);
        let capacity = capacity.max(1);

        Self {
            buffer: Self::create_buffer(device, stride, capacity),
            content_type: PhantomData,
            stride,
            capacity,
            staged: Vec::new(),
        }
    }

    /// Stage a block and return its dynamic offset
    pub fn push(&mut self, content: &Content) -> u32 {
        let offset = self.staged.len();
        self.staged.extend_from_slice(bytemuck::bytes_of(content));
        self.staged.resize(offset + self.stride as usize, 0);
        offset as u32
    }

    pub fn len(&self) -> usize {
        self.staged.len() / self.stride as usize
    }

    pub fn is_empty(&self) -> bool {
        self.staged.is_empty()
    }

    /// Drop staged blocks
    pub fn reset(&mut self) {
        self.staged.clear();
    }

    /// Write staged blocks to the GPU; true when the buffer had to be recreated
    ///
    /// Bind groups referencing the old buffer must be rebuilt after a `true`.
    pub fn upload(&mut self, device: &wgpu::Device, queue: &wgpu::Queue) -> bool {
        let needed = self.len();
        let grew = needed > self.capacity;
        if grew {
            self.capacity = needed.next_power_of_two();
            self.buffer = Self::create_buffer(device, self.stride, self.capacity);
            log::info!(
                "Grew {} to {} blocks",
                Self::name(),
                self.capacity
            );
        }
        if !self.staged.is_empty() {
            queue.write_buffer(&self.buffer, 0, &self.staged);
        }
        grew
    }

    /// Binding covering a single block; pair it with a dynamic offset
    pub fn binding_resource(&self) -> wgpu::BindingResource {
        wgpu::BindingResource::Buffer(wgpu::BufferBinding {
            buffer: &self.buffer,
            offset: 0,
            size: wgpu::BufferSize::new(std::mem::size_of::<Content>() as u64),
        })
    }

    pub fn buffer(&self) -> &wgpu::Buffer {
        &self.buffer
    }

    pub fn stride(&self) -> u64 {
        self.stride
    }

    pub fn capacity(&self) -> usize {
        self.capacity
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_stride_alignment() {
        assert_eq!(aligned_stride(80, 256), 256);
        assert_eq!(aligned_stride(256, 256), 256);
        assert_eq!(aligned_stride(257, 256), 512);
        assert_eq!(aligned_stride(12, 0), 12);
    }
}
