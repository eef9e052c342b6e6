//! SDL2 window that presents composited frames

use riftgate::error::{Error, Result};
use riftgate::frame::Frame;
use sdl2::event::Event;
use sdl2::keyboard::Keycode;
use sdl2::pixels::PixelFormatEnum;
use sdl2::render::{Canvas, Texture, TextureCreator};
use sdl2::video::{Window, WindowContext};
use sdl2::EventPump;

pub const DEFAULT_WIDTH: u32 = 960;
pub const DEFAULT_HEIGHT: u32 = 540;

pub struct Display {
    canvas: Canvas<Window>,
    event_pump: EventPump,
}

/// Streaming RGB24 texture the frames are uploaded into
pub struct RenderTarget<'a> {
    texture: Texture<'a>,
    width: u32,
    height: u32,
}

#[derive(Debug, Clone)]
pub enum InputEvent {
    Quit,
    KeyDown(Keycode),
}

impl Display {
    /// Create display with custom resolution and VSync settings
    /// vsync=true: locked to monitor refresh (typically 60fps)
    /// vsync=false: uncapped framerate for performance testing
    pub fn with_options(
        title: &str,
        width: u32,
        height: u32,
        vsync: bool,
    ) -> Result<(Self, TextureCreator<WindowContext>)> {
        let sdl_context = sdl2::init().map_err(Error::display)?;
        let video_subsystem = sdl_context.video().map_err(Error::display)?;

        let window = video_subsystem
            .window(title, width, height)
            .position_centered()
            .build()
            .map_err(|e| Error::display(e.to_string()))?;

        let mut canvas_builder = window.into_canvas().accelerated();
        if vsync {
            canvas_builder = canvas_builder.present_vsync();
        }
        let canvas = canvas_builder
            .build()
            .map_err(|e| Error::display(e.to_string()))?;

        let texture_creator = canvas.texture_creator();
        let event_pump = sdl_context.event_pump().map_err(Error::display)?;

        Ok((
            Self { canvas, event_pump },
            texture_creator,
        ))
    }

    pub fn set_title(&mut self, title: &str) {
        // Titles never contain interior NULs
        let _ = self.canvas.window_mut().set_title(title);
    }

    pub fn present(&mut self, target: &mut RenderTarget, frame: &Frame) -> Result<()> {
        if frame.width() != target.width || frame.height() != target.height {
            return Err(Error::display(format!(
                "frame {}x{} does not match texture {}x{}",
                frame.width(),
                frame.height(),
                target.width,
                target.height
            )));
        }
        target
            .texture
            .update(None, frame.as_bytes(), frame.pitch())
            .map_err(|e| Error::display(e.to_string()))?;

        self.canvas
            .copy(&target.texture, None, None)
            .map_err(Error::display)?;
        self.canvas.present();
        Ok(())
    }

    pub fn poll_events(&mut self) -> Vec<InputEvent> {
        let mut events = Vec::new();

        for event in self.event_pump.poll_iter() {
            match event {
                Event::Quit { .. } => events.push(InputEvent::Quit),
                Event::KeyDown {
                    keycode: Some(k), ..
                } => events.push(InputEvent::KeyDown(k)),
                _ => {},
            }
        }

        events
    }
}

impl<'a> RenderTarget<'a> {
    pub fn with_size(
        texture_creator: &'a TextureCreator<WindowContext>,
        width: u32,
        height: u32,
    ) -> Result<Self> {
        let texture = texture_creator
            .create_texture_streaming(PixelFormatEnum::RGB24, width, height)
            .map_err(|e| Error::display(e.to_string()))?;
        Ok(Self {
            texture,
            width,
            height,
        })
    }
}
