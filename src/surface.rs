use log::{debug, warn};
use thiserror::Error;
use x11rb::{
    COPY_DEPTH_FROM_PARENT, COPY_FROM_PARENT,
    connection::Connection,
    errors::{ConnectError, ConnectionError, ReplyError, ReplyOrIdError},
    properties::WmSizeHints,
    protocol::{
        Event,
        xproto::{
            AtomEnum, ChangeGCAux, ClientMessageEvent, ConnectionExt as _, CreateGCAux,
            CreateWindowAux, EventMask, Gcontext, Mapping, PropMode, Rectangle, Window,
            WindowClass,
        },
    },
    rust_connection::RustConnection,
    wrapper::ConnectionExt as _,
};

use crate::{
    event_loop::{Surface, WindowEvent},
    keysym::Keymap,
    state::AppState,
};

const POSITION: (i16, i16) = (100, 100);
const BORDER_WIDTH: u16 = 1;
const BACKGROUND: u32 = 0x22_22_22;
const FOREGROUND: u32 = 0xFF_FF_FF;
/// Approximate width of a glyph of the default server font
const CHAR_WIDTH: i32 = 6;

x11rb::atom_manager! {
    Atoms: AtomsCookie {
        WM_PROTOCOLS,
        WM_DELETE_WINDOW,
        UTF8_STRING,
        _NET_WM_NAME,
    }
}

#[derive(Debug, Error)]
pub enum Error {
    #[error("Cannot connect to the X server")]
    Connect(#[from] ConnectError),
    #[error("The connection to the X server was broken")]
    Connection(#[from] ConnectionError),
    #[error("Error from the X server")]
    Reply(#[from] ReplyError),
    #[error("Cannot allocate an X resource")]
    ReplyOrId(#[from] ReplyOrIdError),
}

/// A fixed-size X11 window showing the message of the current state.
///
/// The window is destroyed when this is dropped.
pub struct X11Surface {
    conn: RustConnection,
    window: Window,
    gc: Gcontext,
    width: u16,
    height: u16,
    atoms: Atoms,
    keymap: Keymap,
}

impl X11Surface {
    /// Opens a non-resizable window with `name` as title and class.
    pub fn create(name: &str, width: u16, height: u16) -> Result<Self, Error> {
        let (conn, screen_num) = x11rb::connect(None)?;
        let screen = &conn.setup().roots[screen_num];
        let (root, border) = (screen.root, screen.black_pixel);

        let atoms = Atoms::new(&conn)?.reply()?;
        let keymap = Keymap::fetch(&conn)?;

        let window = conn.generate_id()?;
        conn.create_window(
            COPY_DEPTH_FROM_PARENT,
            window,
            root,
            POSITION.0,
            POSITION.1,
            width,
            height,
            BORDER_WIDTH,
            WindowClass::INPUT_OUTPUT,
            COPY_FROM_PARENT,
            &CreateWindowAux::new()
                .background_pixel(BACKGROUND)
                .border_pixel(border)
                .event_mask(EventMask::EXPOSURE | EventMask::KEY_PRESS),
        )?;

        conn.change_property8(
            PropMode::REPLACE,
            window,
            AtomEnum::WM_NAME,
            AtomEnum::STRING,
            name.as_bytes(),
        )?;
        conn.change_property8(
            PropMode::REPLACE,
            window,
            atoms._NET_WM_NAME,
            atoms.UTF8_STRING,
            name.as_bytes(),
        )?;
        // instance and class, both null-terminated
        conn.change_property8(
            PropMode::REPLACE,
            window,
            AtomEnum::WM_CLASS,
            AtomEnum::STRING,
            format!("{name}\0{name}\0").as_bytes(),
        )?;
        conn.change_property32(
            PropMode::REPLACE,
            window,
            atoms.WM_PROTOCOLS,
            AtomEnum::ATOM,
            &[atoms.WM_DELETE_WINDOW],
        )?;

        let size = (i32::from(width), i32::from(height));
        let hints = WmSizeHints {
            min_size: Some(size),
            max_size: Some(size),
            ..WmSizeHints::default()
        };
        hints.set_normal_hints(&conn, window)?;

        let gc = conn.generate_id()?;
        conn.create_gc(
            gc,
            window,
            &CreateGCAux::new()
                .foreground(FOREGROUND)
                .background(BACKGROUND),
        )?;

        conn.map_window(window)?;
        conn.flush()?;
        debug!("Created window {window:#x}");

        Ok(Self {
            conn,
            window,
            gc,
            width,
            height,
            atoms,
            keymap,
        })
    }

    fn is_delete_request(&self, event: &ClientMessageEvent) -> bool {
        event.format == 32
            && event.type_ == self.atoms.WM_PROTOCOLS
            && event.data.as_data32()[0] == self.atoms.WM_DELETE_WINDOW
    }
}

impl Surface for X11Surface {
    type Error = Error;

    fn next_event(&mut self) -> Result<WindowEvent, Error> {
        Ok(match self.conn.wait_for_event()? {
            // only draw once per burst of exposures
            Event::Expose(event) if event.count == 0 => WindowEvent::Redraw,
            Event::KeyPress(event) => WindowEvent::Key(self.keymap.key(event.detail)),
            Event::ClientMessage(event) if self.is_delete_request(&event) => WindowEvent::Close,
            Event::MappingNotify(event) if event.request == Mapping::KEYBOARD => {
                self.keymap = Keymap::fetch(&self.conn)?;
                WindowEvent::Other
            }
            Event::Error(e) => {
                warn!("X11 error: {e:?}");
                WindowEvent::Other
            }
            _ => WindowEvent::Other,
        })
    }

    fn render(&mut self, state: AppState) -> Result<(), Error> {
        let text = state.message();

        self.conn
            .change_gc(self.gc, &ChangeGCAux::new().foreground(BACKGROUND))?;
        self.conn.poly_fill_rectangle(
            self.window,
            self.gc,
            &[Rectangle {
                x: 0,
                y: 0,
                width: self.width,
                height: self.height,
            }],
        )?;

        self.conn
            .change_gc(self.gc, &ChangeGCAux::new().foreground(FOREGROUND))?;
        let (x, y) = text_origin(text, self.width, self.height);
        self.conn
            .image_text8(self.window, self.gc, x, y, text.as_bytes())?;

        self.conn.flush()?;
        Ok(())
    }
}

impl Drop for X11Surface {
    fn drop(&mut self) {
        let result = self
            .conn
            .free_gc(self.gc)
            .and_then(|_| self.conn.destroy_window(self.window))
            .and_then(|_| self.conn.flush());
        if let Err(e) = result {
            warn!("Failed to destroy window: {e}");
        }
    }
}

/// Baseline origin of `text`, horizontally centered and vertically at the middle.
pub fn text_origin(text: &str, width: u16, height: u16) -> (i16, i16) {
    let text_width = i32::try_from(text.len())
        .unwrap_or(i32::MAX)
        .saturating_mul(CHAR_WIDTH);
    let x = ((i32::from(width) - text_width) / 2).max(0);
    let y = i32::from(height) / 2;

    (
        i16::try_from(x).unwrap_or(i16::MAX),
        i16::try_from(y).unwrap_or(i16::MAX),
    )
}
