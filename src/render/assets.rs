// Inline stylesheet and client script for the dashboard page.

pub const STYLE: &str = r#"
body{font-family:-apple-system,BlinkMacSystemFont,'Segoe UI',sans-serif;margin:0;padding:0 16px;color:#222}
nav{display:flex;gap:4px;border-bottom:1px solid #ccc;margin:12px 0}
nav .tab{padding:8px 14px;text-decoration:none;color:#555;border:1px solid transparent;border-bottom:none}
nav .tab.active{color:#000;border-color:#ccc;background:#fff}
section{margin-bottom:16px}
body[data-active-tab="files"] #region-overview,body[data-active-tab="files"] #region-general,body[data-active-tab="files"] #region-preload{display:none}
body[data-active-tab="overview"] #region-files,body[data-active-tab="overview"] #filter,body[data-active-tab="overview"] #invalidate-searched{display:none}
table{border-collapse:collapse;margin:8px 0;min-width:40%}
th,td{text-align:left;padding:4px 8px;border-bottom:1px solid #eee;vertical-align:top}
tr.odd{background:#f6f6f6}
.highlights{display:flex;gap:16px;flex-wrap:wrap}
.widget{border:1px solid #ddd;border-radius:6px;padding:8px 16px;text-align:center}
.big{font-size:2.4em;margin:4px 0}
.gauge{width:90px;height:90px;border-radius:50%;display:flex;align-items:center;justify-content:center;margin:auto;
  background:conic-gradient(#4a8aff var(--deg,0deg),#e6e6e6 0)}
.gauge span{background:#fff;border-radius:50%;width:64px;height:64px;display:flex;align-items:center;justify-content:center}
.notice{padding:8px 12px;background:#fff4d6;border:1px solid #f0c36d}
.invalidated{color:#b00}
#filter{width:60%;padding:6px;margin:8px 0}
"#;

pub const CLIENT: &str = r#"
(function(){
  var body=document.body, ws=null, gaugeTimers={};
  function realtime(){return body.dataset.realtime==='true';}
  function send(ev){if(ws&&ws.readyState===1){ws.send(JSON.stringify(ev));return true;}return false;}
  function toPercent(d){return Math.round(d/360*100);}
  function animate(metric,a){
    var el=document.getElementById('gauge-'+metric.replace(/[A-Z]/g,function(c){return '-'+c.toLowerCase();}));
    if(!el)return;
    clearInterval(gaugeTimers[metric]);
    var cur=a.from, step=a.from<a.to?1:-1;
    function paint(){el.style.setProperty('--deg',cur+'deg');el.dataset.degrees=cur;el.firstChild.textContent=(cur===a.to?a.percent:toPercent(cur))+'%';}
    paint();
    if(a.from===a.to)return;
    gaugeTimers[metric]=setInterval(function(){cur+=step;paint();if(cur===a.to)clearInterval(gaugeTimers[metric]);},a.stepIntervalMs);
  }
  function notice(msg,ok){var n=document.getElementById('notice');n.textContent=msg;n.hidden=!msg;n.dataset.success=ok;}
  function apply(u){
    if(u.type==='region'){var s=document.getElementById(u.id);if(s)s.innerHTML=u.html;}
    else if(u.type==='gauge'){animate(u.metric,u.animation);}
    else if(u.type==='tab'){body.dataset.activeTab=u.active;
      document.querySelectorAll('nav .tab').forEach(function(t){t.classList.toggle('active',t.dataset.tab===u.active);});}
    else if(u.type==='realtime'){body.dataset.realtime=u.enabled?'true':'false';if(u.setCookie)document.cookie=u.setCookie;}
    else if(u.type==='notice'){notice(u.message,u.success);}
  }
  function connect(){
    var proto=location.protocol==='https:'?'wss:':'ws:';
    var path=location.pathname.replace(/\/$/,'');
    ws=new WebSocket(proto+'//'+location.host+path+'/ws');
    ws.onmessage=function(m){try{apply(JSON.parse(m.data));}catch(e){}};
    ws.onclose=function(){ws=null;setTimeout(connect,5000);};
  }
  document.addEventListener('click',function(e){
    var t=e.target.closest('[data-tab],[data-invalidate],#invalidate-searched,.pager');
    if(!t)return;
    if(t.dataset.tab==='realtime'){e.preventDefault();send({type:'realtime',enabled:!realtime()});return;}
    if(t.dataset.tab==='reset'){if(realtime()&&send({type:'reset'}))e.preventDefault();return;}
    if(t.dataset.tab){if(send({type:'selectTab',tab:t.dataset.tab}))e.preventDefault();return;}
    if(t.dataset.invalidate!==undefined){if(realtime()&&send({type:'invalidate',path:t.dataset.invalidate}))e.preventDefault();return;}
    if(t.id==='invalidate-searched'){var q=document.getElementById('filter').value;
      if(!(realtime()&&send({type:'invalidateSearched',text:q})))location.search='?invalidate_searched='+encodeURIComponent(q);return;}
    if(t.classList.contains('pager')){var p=+t.dataset.page, n=+t.dataset.pages;send({type:'page',page:p<n?p+1:1});}
  });
  var filter=document.getElementById('filter');
  if(filter)filter.addEventListener('input',function(){send({type:'filter',text:filter.value});});
  connect();
})();
"#;
