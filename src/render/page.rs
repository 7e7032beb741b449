use crate::models::CallerRecord;

/// Render the caller history as a complete HTML document.
///
/// Pure function of the records: the page carries a bold header row and one
/// grid row per record, newest first, in the order the store returned them.
pub fn render_page(records: &[CallerRecord]) -> String {
    format!(
        r#"<!DOCTYPE html>
<html lang="en">

<head>
<title>Call Home Addresses ☎️</title>
<meta charset="utf-8" />
<meta name="viewport" content="width=device-width, initial-scale=1.0" />
<style>
    body     {{ width: 800px; margin: auto; background-color: #d8e2dc; font-size: large; font-family: sans-serif; }}

    .title   {{ margin: 1em 0; font-size: 3em; }}

    div.address {{ display: grid; grid-template-columns: 1fr 1fr 1fr; padding-top: 0.25em; }}
    div.address:first-of-type {{ font-weight: bold; }}

    @media only screen
    and (min-device-width : 320px)
    and (max-device-width : 480px) {{
        body {{ width: 95%; }}
        .title {{ font-size: 4em; text-align: center; }}

        div.address {{ display: grid; grid-template-columns: 1fr 1fr; padding-top: 1em; font-size: 10pt; }}
        div.pings {{ display: none; }}
    }}
</style>
</head>

<body>
<div class="title">Call Home Addresses ☎️</div>
<div class="addresses">
{rows}</div>
</body>

</html>
"#,
        rows = render_rows(records),
    )
}

fn render_rows(records: &[CallerRecord]) -> String {
    let mut rows = render_row("Address", "Pings", "Last Seen");

    for record in records {
        rows.push_str(&render_row(
            &record.caller,
            &record.pings.to_string(),
            &record.lastseen,
        ));
    }

    rows
}

fn render_row(caller: &str, pings: &str, lastseen: &str) -> String {
    format!(
        r#"    <div class="address">
        <div class="caller">{caller}</div>
        <div class="pings">{pings}</div>
        <div class="lastseen">{lastseen}</div>
    </div>
"#,
        caller = html_escape(caller),
        pings = html_escape(pings),
        lastseen = html_escape(lastseen),
    )
}

/// Escape HTML special characters
fn html_escape(input: &str) -> String {
    input
        .replace('&', "&amp;")
        .replace('<', "&lt;")
        .replace('>', "&gt;")
        .replace('"', "&quot;")
        .replace('\'', "&#x27;")
}
