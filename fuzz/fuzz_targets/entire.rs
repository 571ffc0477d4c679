#![no_main]
use libfuzzer_sys::fuzz_target;
use tgr::{PlayerColorTable, TgrFile};

fuzz_target!(|data: &[u8]| {
    let Ok(file) = TgrFile::from_mem(data.to_vec()) else {
        return;
    };

    if file.size().0 as usize * file.size().1 as usize > 5000 {
        return;
    }

    let players = PlayerColorTable::default_player_two();
    for index in 0..file.framecount() as usize {
        let _ = file.decode_frame(index, &players, 2, false);
    }
});
