//! Wire lines shared by the stream tests.

use std::time::Duration;

pub(crate) const VERSION_LINE: &str = r#"[4,"2.0",1489568040000]"#;

pub(crate) const STOP_LINE: &str = r#"[0,"Bushof","100000","H.1",0,50.7775,6.0883]"#;

pub(crate) const MESSAGE_LINE: &str =
    r#"[2,"Bushof","100000","H.1",0,50.7775,6.0883,"5c8f1e2a",0,3,"Stop closed due to roadworks"]"#;

/// A valid trip line with the given trip ID.
pub(crate) fn trip_line(trip_id: &str) -> String {
    format!(
        r#"[1,"Bushof","100000","H.1",0,50.7775,6.0883,4,"33","33",1,"Vaals Busstation","Vaals",247,"{trip_id}",1489568040000]"#
    )
}

/// Poll `condition` until it holds, failing the test after five seconds.
pub(crate) async fn wait_until(mut condition: impl FnMut() -> bool) {
    let reached = tokio::time::timeout(Duration::from_secs(5), async {
        while !condition() {
            tokio::time::sleep(Duration::from_millis(5)).await;
        }
    })
    .await;
    assert!(reached.is_ok(), "condition not reached within 5s");
}
