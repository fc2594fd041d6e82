//! Offscreen render target for rendering overlay frames to an image

use crate::error::RenderError;

const BYTES_PER_PIXEL: u32 = 4;

/// wgpu device plus a transparent color texture the overlay draws into
pub struct HeadlessContext {
    pub device: wgpu::Device,
    pub queue: wgpu::Queue,
    /// Linear target: effect shaders already output display-ready colors
    pub format: wgpu::TextureFormat,
    pub width: u32,
    pub height: u32,
    pub color_texture: wgpu::Texture,
    pub color_view: wgpu::TextureView,
}

impl HeadlessContext {
    /// Acquire any adapter (no surface) and allocate a `width` x `height` target.
    pub async fn new(width: u32, height: u32) -> Result<Self, RenderError> {
        let (device, queue) = request_device().await?;
        let format = wgpu::TextureFormat::Rgba8Unorm;
        let color_texture = device.create_texture(&wgpu::TextureDescriptor {
            label: Some("overlay color target"),
            size: extent(width, height),
            mip_level_count: 1,
            sample_count: 1,
            dimension: wgpu::TextureDimension::D2,
            format,
            usage: wgpu::TextureUsages::RENDER_ATTACHMENT | wgpu::TextureUsages::COPY_SRC,
            view_formats: &[],
        });
        let color_view = color_texture.create_view(&Default::default());

        Ok(Self {
            device,
            queue,
            format,
            width,
            height,
            color_texture,
            color_view,
        })
    }

    pub fn screen_size(&self) -> [f32; 2] {
        [self.width as f32, self.height as f32]
    }

    /// Copy the color target back to the CPU as tightly packed RGBA rows.
    pub async fn read_pixels(&self) -> Result<Vec<u8>, RenderError> {
        let row_bytes = padded_row_bytes(self.width);
        let staging = self.device.create_buffer(&wgpu::BufferDescriptor {
            label: Some("overlay readback"),
            size: u64::from(row_bytes) * u64::from(self.height),
            usage: wgpu::BufferUsages::COPY_DST | wgpu::BufferUsages::MAP_READ,
            mapped_at_creation: false,
        });

        let mut encoder = self.device.create_command_encoder(&Default::default());
        encoder.copy_texture_to_buffer(
            self.color_texture.as_image_copy(),
            wgpu::ImageCopyBuffer {
                buffer: &staging,
                layout: wgpu::ImageDataLayout {
                    offset: 0,
                    bytes_per_row: Some(row_bytes),
                    rows_per_image: Some(self.height),
                },
            },
            extent(self.width, self.height),
        );
        self.queue.submit([encoder.finish()]);

        let slice = staging.slice(..);
        let (tx, rx) = std::sync::mpsc::channel();
        slice.map_async(wgpu::MapMode::Read, move |result| {
            let _ = tx.send(result);
        });
        self.device.poll(wgpu::Maintain::Wait);
        rx.recv()
            .map_err(|e| RenderError::BufferReadFailed(e.to_string()))?
            .map_err(|e| RenderError::BufferReadFailed(e.to_string()))?;

        let pixels = {
            let mapped = slice.get_mapped_range();
            unpad_rows(&mapped, self.width, self.height)
        };
        staging.unmap();
        Ok(pixels)
    }
}

async fn request_device() -> Result<(wgpu::Device, wgpu::Queue), RenderError> {
    let instance = wgpu::Instance::new(wgpu::InstanceDescriptor {
        backends: wgpu::Backends::all(),
        ..Default::default()
    });
    let adapter = instance
        .request_adapter(&wgpu::RequestAdapterOptions::default())
        .await
        .ok_or(RenderError::AdapterNotFound)?;
    adapter
        .request_device(
            &wgpu::DeviceDescriptor {
                label: Some("cursorfx headless device"),
                ..Default::default()
            },
            None,
        )
        .await
        .map_err(|e| RenderError::DeviceCreation(e.to_string()))
}

fn extent(width: u32, height: u32) -> wgpu::Extent3d {
    wgpu::Extent3d {
        width,
        height,
        depth_or_array_layers: 1,
    }
}

/// Row stride of a texture-to-buffer copy, rounded up to wgpu's alignment
fn padded_row_bytes(width: u32) -> u32 {
    let align = wgpu::COPY_BYTES_PER_ROW_ALIGNMENT;
    (width * BYTES_PER_PIXEL).div_ceil(align) * align
}

fn unpad_rows(data: &[u8], width: u32, height: u32) -> Vec<u8> {
    let stride = padded_row_bytes(width) as usize;
    let row = (width * BYTES_PER_PIXEL) as usize;
    data.chunks(stride)
        .take(height as usize)
        .flat_map(|padded| &padded[..row])
        .copied()
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_row_stride_is_aligned() {
        assert_eq!(padded_row_bytes(64), 256);
        assert_eq!(padded_row_bytes(65), 512);
        assert_eq!(padded_row_bytes(1), 256);
    }

    #[test]
    fn test_unpad_rows_drops_padding() {
        let stride = padded_row_bytes(2) as usize;
        let mut data = vec![0xAAu8; stride * 2];
        data[..8].copy_from_slice(&[1, 2, 3, 4, 5, 6, 7, 8]);
        data[stride..stride + 8].copy_from_slice(&[9, 10, 11, 12, 13, 14, 15, 16]);

        let pixels = unpad_rows(&data, 2, 2);
        assert_eq!(pixels, (1..=16).collect::<Vec<u8>>());
    }
}
