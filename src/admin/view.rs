use crate::users::repo_types::User;

fn escape(s: &str) -> String {
    let mut out = String::with_capacity(s.len());
    for c in s.chars() {
        match c {
            '&' => out.push_str("&amp;"),
            '<' => out.push_str("&lt;"),
            '>' => out.push_str("&gt;"),
            '"' => out.push_str("&quot;"),
            '\'' => out.push_str("&#39;"),
            _ => out.push(c),
        }
    }
    out
}

fn render_rows(users: &[User]) -> String {
    users
        .iter()
        .enumerate()
        .map(|(i, u)| {
            format!(
                r#"<tr data-id="{id}">
  <th scope="row">{n}</th>
  <td>{name}</td>
  <td>{email}</td>
  <td><button type="button" class="delete" data-id="{id}" title="Delete">Delete</button></td>
</tr>"#,
                id = u.id,
                n = i + 1,
                name = escape(&u.name),
                email = escape(&u.email),
            )
        })
        .collect::<Vec<_>>()
        .join("\n")
}

/// Full admin page: a table of users with a delete action per row. Deleting
/// calls the JSON API and reloads the page.
pub fn render_user_table(users: &[User]) -> String {
    format!(
        r#"<!DOCTYPE html>
<html lang="en">
<head>
  <meta charset="utf-8">
  <title>Users</title>
  <style>
    body {{ font-family: system-ui, sans-serif; margin: 2rem; }}
    table {{ border-collapse: collapse; width: 100%; }}
    th, td {{ text-align: left; padding: .5rem; border-bottom: 1px solid #ddd; }}
    tbody tr:hover {{ background: #f5f5f5; }}
    button.delete {{ cursor: pointer; }}
  </style>
</head>
<body>
  <table class="table table-hover">
    <thead>
      <tr>
        <th scope="col">Sr. no.</th>
        <th scope="col">Name</th>
        <th scope="col">Email</th>
        <th scope="col">Action</th>
      </tr>
    </thead>
    <tbody>
{rows}
    </tbody>
  </table>
  <script>
    document.querySelectorAll('button.delete').forEach(function (btn) {{
      btn.addEventListener('click', function () {{
        fetch('/api/users/' + btn.dataset.id, {{ method: 'DELETE' }})
          .then(function () {{ window.location.reload(); }});
      }});
    }});
  </script>
</body>
</html>
"#,
        rows = render_rows(users)
    )
}
