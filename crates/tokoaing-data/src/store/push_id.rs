use chrono::Utc;
use parking_lot::Mutex;

use crate::util::random_bytes;

/// 64-symbol alphabet in ASCII order, so encoded timestamps sort the same
/// as the instants they encode.
const PUSH_CHARS: &[u8; 64] = b"-0123456789ABCDEFGHIJKLMNOPQRSTUVWXYZ_abcdefghijklmnopqrstuvwxyz";

const TIME_LEN: usize = 8;
const RANDOM_LEN: usize = 12;

struct State {
    last_ms: i64,
    random: [u8; RANDOM_LEN],
}

/// Generator of 20-character push ids: 8 characters of millisecond
/// timestamp followed by 12 random characters.
///
/// Ids from one generator are strictly increasing: within the same
/// millisecond (or if the clock steps backwards) the random tail is
/// incremented instead of redrawn.
pub struct PushIdGenerator {
    state: Mutex<State>,
}

impl PushIdGenerator {
    pub fn new() -> Self {
        Self {
            state: Mutex::new(State {
                last_ms: -1,
                random: [0; RANDOM_LEN],
            }),
        }
    }

    pub fn next_id(&self) -> String {
        let now = Utc::now().timestamp_millis();
        let mut state = self.state.lock();

        if now <= state.last_ms {
            for slot in state.random.iter_mut().rev() {
                if *slot == 63 {
                    *slot = 0;
                } else {
                    *slot += 1;
                    break;
                }
            }
        } else {
            let fresh = random_bytes(RANDOM_LEN);
            for (slot, byte) in state.random.iter_mut().zip(fresh) {
                *slot = byte % 64;
            }
            state.last_ms = now;
        }

        let mut out = [0u8; TIME_LEN + RANDOM_LEN];
        let mut ts = state.last_ms;
        for i in (0..TIME_LEN).rev() {
            out[i] = PUSH_CHARS[(ts % 64) as usize];
            ts /= 64;
        }
        for (i, slot) in state.random.iter().enumerate() {
            out[TIME_LEN + i] = PUSH_CHARS[*slot as usize];
        }

        String::from_utf8_lossy(&out).into_owned()
    }
}

impl Default for PushIdGenerator {
    fn default() -> Self {
        Self::new()
    }
}
