//! Index page
//!
//! Hosts the editor in an iframe and relays every message between the frame
//! and the live session API.

/// Index HTML template
pub const INDEX_HTML: &str = r#"<!DOCTYPE html>
<html lang="en">
<head>
    <meta charset="UTF-8">
    <meta name="viewport" content="width=device-width, initial-scale=1.0">
    <title>Editor Playground</title>
    <style>
        * { box-sizing: border-box; margin: 0; padding: 0; }
        body {
            font-family: -apple-system, BlinkMacSystemFont, 'Segoe UI', Roboto, sans-serif;
            background: #f5f5f5;
            color: #333;
            display: grid;
            grid-template-columns: 1fr 420px;
            height: 100vh;
        }
        iframe { width: 100%; height: 100%; border: none; }
        aside { display: flex; flex-direction: column; border-left: 1px solid #ddd; background: white; min-height: 0; }
        header { background: #2c3e50; color: white; padding: 12px 16px; }
        header h1 { font-size: 18px; }
        header small { opacity: 0.7; font-family: monospace; }
        .toolbar { display: flex; gap: 8px; padding: 8px 16px; flex-wrap: wrap; }
        button {
            background: #3498db;
            color: white;
            border: none;
            padding: 6px 12px;
            border-radius: 4px;
            cursor: pointer;
        }
        button:hover { background: #2980b9; }
        button.danger { background: #c0392b; }
        textarea { width: 100%; font-family: monospace; padding: 8px; border: 1px solid #ddd; border-radius: 4px; }
        .panel { padding: 8px 16px; }
        #log { flex: 1; overflow-y: auto; padding: 8px 16px; }
        .entry { border-bottom: 1px solid #eee; padding: 6px 0; font-size: 13px; }
        .entry .meta { color: #888; font-size: 11px; display: flex; justify-content: space-between; }
        .entry pre { white-space: pre-wrap; word-break: break-all; }
        .entry.sent pre { color: #2c3e50; }
        .entry.received pre { color: #16a085; }
        .entry img { max-width: 100%; max-height: 160px; display: block; margin-top: 4px; }
        #sessions li { list-style: none; display: flex; justify-content: space-between; font-size: 12px; padding: 2px 0; }
    </style>
</head>
<body>
    <iframe id="editor" title="Editor"></iframe>
    <aside>
        <header>
            <h1>Editor Playground</h1>
            <small id="session-id">-</small>
        </header>
        <div class="toolbar">
            <button onclick="newSession()">New session</button>
            <button onclick="clearLog()" class="danger">Clear log</button>
            <button onclick="loadSessions()">Sessions</button>
        </div>
        <div class="panel">
            <textarea id="script" rows="4" placeholder="app.echoToOE(app.documents.length)"></textarea>
            <button onclick="sendScript()">Send</button>
        </div>
        <div class="panel">
            <textarea id="images" rows="2" placeholder="Image URLs, one per line"></textarea>
            <button onclick="setImages()">Open images</button>
        </div>
        <ul id="sessions" class="panel"></ul>
        <div id="log"></div>
    </aside>
    <script>
        const frame = document.getElementById('editor');
        let editorOrigin = null;

        async function api(method, path, body) {
            const res = await fetch(path, {
                method,
                headers: body === undefined ? {} : { 'Content-Type': 'application/json' },
                body: body === undefined ? undefined : JSON.stringify(body),
            });
            if (!res.ok) throw new Error(method + ' ' + path + ': ' + res.status);
            return res.status === 204 ? null : res.json();
        }

        function loadEditor(url) {
            editorOrigin = new URL(url).origin;
            if (frame.src !== url) frame.src = url;
        }

        function renderEntry(m) {
            const div = document.createElement('div');
            div.className = 'entry ' + m.direction;
            div.id = 'entry-' + m.id;
            const meta = document.createElement('div');
            meta.className = 'meta';
            const label = document.createElement('span');
            label.textContent = '#' + m.id + ' ' + m.direction + ' ' + m.dataType + (m.at ? ' ' + new Date(m.at).toLocaleTimeString() : '');
            const remove = document.createElement('a');
            remove.href = '#';
            remove.textContent = 'remove';
            remove.onclick = async (e) => {
                e.preventDefault();
                await api('DELETE', '/api/live/messages/' + m.id);
                div.remove();
            };
            meta.append(label, remove);
            const pre = document.createElement('pre');
            pre.textContent = m.content;
            div.append(meta, pre);
            if (m.previewUrl) {
                const img = document.createElement('img');
                img.src = m.previewUrl;
                img.onerror = () => img.remove();
                const link = document.createElement('a');
                link.href = m.previewUrl + '?download=true';
                link.textContent = 'download';
                div.append(img, link);
            }
            const log = document.getElementById('log');
            log.append(div);
            log.scrollTop = log.scrollHeight;
        }

        function renderLive(view) {
            document.getElementById('session-id').textContent = view.id;
            document.getElementById('images').value = view.imageUrls.join('\n');
            document.getElementById('log').innerHTML = '';
            view.messages.forEach(renderEntry);
            if (view.editorUrl) loadEditor(view.editorUrl);
        }

        function toBase64(buffer) {
            const bytes = new Uint8Array(buffer);
            let binary = '';
            for (let i = 0; i < bytes.length; i += 0x8000) {
                binary += String.fromCharCode.apply(null, bytes.subarray(i, i + 0x8000));
            }
            return btoa(binary);
        }

        async function toEnvelope(data) {
            if (typeof data === 'string') return { kind: 'string', value: data };
            if (typeof data === 'number') return { kind: 'number', value: Number.isFinite(data) ? data : String(data) };
            if (typeof data === 'boolean') return { kind: 'boolean', value: data };
            if (data instanceof ArrayBuffer) return { kind: 'binary', type: 'ArrayBuffer', base64: toBase64(data) };
            if (ArrayBuffer.isView(data)) {
                const view = new Uint8Array(data.buffer, data.byteOffset, data.byteLength);
                return { kind: 'binary', type: data.constructor.name, base64: toBase64(view) };
            }
            if (data instanceof Blob) {
                return { kind: 'blob', base64: toBase64(await data.arrayBuffer()), mediaType: data.type || undefined };
            }
            if (data !== null && typeof data === 'object') {
                try {
                    return { kind: 'object', value: JSON.parse(JSON.stringify(data)) };
                } catch (e) {
                    return { kind: 'object', repr: String(data) };
                }
            }
            return { kind: 'other', typeName: data === null ? 'null' : typeof data, repr: String(data) };
        }

        // Posts are chained so the log keeps arrival order even when a Blob
        // takes longer to read than the messages after it
        let relay = Promise.resolve();

        async function relayMessage(event) {
            const res = await fetch('/api/live/inbound', {
                method: 'POST',
                headers: { 'Content-Type': 'application/json' },
                body: JSON.stringify({ origin: event.origin, payload: await toEnvelope(event.data) }),
            });
            if (res.status === 200) renderEntry(await res.json());
        }

        window.addEventListener('message', (event) => {
            if (event.source !== frame.contentWindow) return;
            relay = relay.then(() => relayMessage(event)).catch(e => console.error('Relay failed:', e));
        });

        async function sendScript() {
            const script = document.getElementById('script').value;
            if (!script.trim() || !editorOrigin) return;
            renderEntry(await api('POST', '/api/live/send', { script }));
            frame.contentWindow.postMessage(script, editorOrigin);
        }

        async function setImages() {
            const urls = document.getElementById('images').value.split('\n').map(s => s.trim()).filter(Boolean);
            const metadata = await api('POST', '/api/live/images', { urls });
            if (metadata.editorUrl) loadEditor(metadata.editorUrl);
        }

        async function newSession() {
            renderLive(await api('POST', '/api/live/new'));
        }

        async function clearLog() {
            await api('DELETE', '/api/live/messages');
            document.getElementById('log').innerHTML = '';
        }

        async function loadSessions() {
            const list = document.getElementById('sessions');
            list.innerHTML = '';
            for (const s of await api('GET', '/api/sessions')) {
                const li = document.createElement('li');
                const label = document.createElement('span');
                label.textContent = s.id + ' (' + s.messageCount + ') ' + new Date(s.updatedAt).toLocaleString();
                const resume = document.createElement('a');
                resume.href = '#';
                resume.textContent = 'resume';
                resume.onclick = async (e) => {
                    e.preventDefault();
                    renderLive(await api('POST', '/api/live/resume/' + s.id));
                };
                const remove = document.createElement('a');
                remove.href = '#';
                remove.textContent = 'delete';
                remove.onclick = async (e) => {
                    e.preventDefault();
                    await api('DELETE', '/api/sessions/' + s.id);
                    li.remove();
                };
                li.append(label, resume, remove);
                list.append(li);
            }
        }

        api('GET', '/api/live').then(renderLive).catch(e => console.error('Failed to load session:', e));
    </script>
</body>
</html>
"#;
