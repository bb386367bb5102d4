//! Per-frame command encoding.

use crate::upscale::UpscaleTarget;

/// Configures the single color pass the galaxy is drawn in.
#[derive(Debug, Clone)]
pub struct RenderPassBuilder {
    clear_color: wgpu::Color,
    label: Option<&'static str>,
}

impl Default for RenderPassBuilder {
    fn default() -> Self {
        Self::new()
    }
}

impl RenderPassBuilder {
    /// A pass that clears to black.
    pub fn new() -> Self {
        Self {
            clear_color: wgpu::Color::BLACK,
            label: None,
        }
    }

    pub fn clear_color(mut self, color: wgpu::Color) -> Self {
        self.clear_color = color;
        self
    }

    pub fn label(mut self, label: &'static str) -> Self {
        self.label = Some(label);
        self
    }

    fn begin<'encoder>(
        &self,
        encoder: &'encoder mut wgpu::CommandEncoder,
        view: &'encoder wgpu::TextureView,
    ) -> wgpu::RenderPass<'encoder> {
        encoder.begin_render_pass(&wgpu::RenderPassDescriptor {
            label: self.label,
            color_attachments: &[Some(wgpu::RenderPassColorAttachment {
                view,
                resolve_target: None,
                ops: wgpu::Operations {
                    load: wgpu::LoadOp::Clear(self.clear_color),
                    store: wgpu::StoreOp::Store,
                },
                depth_slice: None,
            })],
            depth_stencil_attachment: None,
            timestamp_writes: None,
            occlusion_query_set: None,
            multiview_mask: None,
        })
    }
}

/// Encodes one frame: passes into offscreen targets, then the upscale onto
/// the acquired surface texture, then submit and present.
///
/// Dropping an unsubmitted encoder still submits, so an early return in the
/// draw code does not leave the swapchain image unpresented.
pub struct FrameEncoder<'q> {
    queue: &'q wgpu::Queue,
    encoder: Option<wgpu::CommandEncoder>,
    surface_texture: Option<wgpu::SurfaceTexture>,
    view: wgpu::TextureView,
}

impl<'q> FrameEncoder<'q> {
    pub fn new(
        device: &wgpu::Device,
        queue: &'q wgpu::Queue,
        surface_texture: wgpu::SurfaceTexture,
    ) -> Self {
        let encoder = device.create_command_encoder(&wgpu::CommandEncoderDescriptor {
            label: Some("galaxy-frame"),
        });
        let view = surface_texture
            .texture
            .create_view(&wgpu::TextureViewDescriptor::default());

        Self {
            queue,
            encoder: Some(encoder),
            surface_texture: Some(surface_texture),
            view,
        }
    }

    /// Begins a render pass into `target`.
    ///
    /// Returns `None` once the frame has been submitted.
    pub fn begin_render_pass<'a>(
        &'a mut self,
        builder: &RenderPassBuilder,
        target: &'a wgpu::TextureView,
    ) -> Option<wgpu::RenderPass<'a>> {
        let encoder = self.encoder.as_mut()?;
        Some(builder.begin(encoder, target))
    }

    /// Stretches `target` over the whole surface texture.
    pub fn upscale_to_surface(&mut self, target: &UpscaleTarget) {
        if let Some(encoder) = self.encoder.as_mut() {
            target.blit(encoder, &self.view);
        }
    }

    /// Submits the recorded commands and presents the frame.
    pub fn submit(mut self) {
        self.finish();
    }

    fn finish(&mut self) {
        if let (Some(encoder), Some(surface_texture)) =
            (self.encoder.take(), self.surface_texture.take())
        {
            self.queue.submit([encoder.finish()]);
            surface_texture.present();
        }
    }
}

impl Drop for FrameEncoder<'_> {
    fn drop(&mut self) {
        if self.encoder.is_some() {
            log::warn!("FrameEncoder dropped without submit(), submitting now");
            self.finish();
        }
    }
}
