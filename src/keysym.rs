use x11rb::{
    connection::Connection,
    errors::ReplyError,
    protocol::xproto::{ConnectionExt as _, Keycode, Keysym},
};

use crate::state::Key;

const XK_RETURN: Keysym = 0xff0d;
const XK_KP_ENTER: Keysym = 0xff8d;
const XK_ESCAPE: Keysym = 0xff1b;

/// Keycode to keysym table of the X server.
#[derive(Debug, Clone, Default)]
pub struct Keymap {
    min_keycode: Keycode,
    keysyms_per_keycode: u8,
    keysyms: Vec<Keysym>,
}

impl Keymap {
    pub fn fetch<C: Connection>(conn: &C) -> Result<Self, ReplyError> {
        let setup = conn.setup();
        let min_keycode = setup.min_keycode;
        let count = setup.max_keycode - min_keycode + 1;

        let reply = conn.get_keyboard_mapping(min_keycode, count)?.reply()?;
        Ok(Self {
            min_keycode,
            keysyms_per_keycode: reply.keysyms_per_keycode,
            keysyms: reply.keysyms,
        })
    }

    /// The first keysym of `keycode`, ignoring modifiers.
    pub fn keysym(&self, keycode: Keycode) -> Option<Keysym> {
        let offset = keycode.checked_sub(self.min_keycode)?;
        let index = usize::from(offset) * usize::from(self.keysyms_per_keycode);
        self.keysyms.get(index).copied().filter(|&keysym| keysym != 0)
    }

    pub fn key(&self, keycode: Keycode) -> Key {
        self.keysym(keycode).map_or(Key::Other, key_from_keysym)
    }
}

pub fn key_from_keysym(keysym: Keysym) -> Key {
    match keysym {
        XK_RETURN | XK_KP_ENTER => Key::Return,
        XK_ESCAPE => Key::Escape,
        // Latin-1 keysyms are their own code point
        0x20..=0x7e => {
            char::from_u32(keysym).map_or(Key::Other, |c| Key::Char(c.to_ascii_lowercase()))
        }
        _ => Key::Other,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn keymap() -> Keymap {
        // keycodes 8 and 9, two keysyms each
        Keymap {
            min_keycode: 8,
            keysyms_per_keycode: 2,
            keysyms: vec![0x72, 0x52, 0, 0],
        }
    }

    #[test]
    fn latin_keysyms() {
        assert_eq!(key_from_keysym(0x72), Key::Char('r'));
        assert_eq!(key_from_keysym(0x52), Key::Char('r'));
        assert_eq!(key_from_keysym(0x71), Key::Char('q'));
    }

    #[test]
    fn special_keysyms() {
        assert_eq!(key_from_keysym(XK_RETURN), Key::Return);
        assert_eq!(key_from_keysym(XK_KP_ENTER), Key::Return);
        assert_eq!(key_from_keysym(XK_ESCAPE), Key::Escape);
        assert_eq!(key_from_keysym(0xffe1), Key::Other);
    }

    #[test]
    fn first_keysym_is_used() {
        assert_eq!(keymap().keysym(8), Some(0x72));
        assert_eq!(keymap().key(8), Key::Char('r'));
    }

    #[test]
    fn unmapped_keycodes() {
        assert_eq!(keymap().keysym(9), None);
        assert_eq!(keymap().key(7), Key::Other);
        assert_eq!(keymap().key(200), Key::Other);
    }
}
